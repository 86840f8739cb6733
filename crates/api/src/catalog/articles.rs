//! Article operations: create, read, update, delete, list.

use std::str::FromStr;

use catalog_core::assets::{check_upload, AcceptedUpload, AssetKind, AssetStore, UploadedFile};
use catalog_core::catalog::{TaxCategory, MAX_NAME_LEN};
use catalog_core::error::CoreError;
use catalog_core::types::{Amount, DbId};
use catalog_core::validation::{validate_non_negative, validate_percentage, FieldErrors};
use catalog_db::models::article::{Article, ArticleDetail, CreateArticle, UpdateArticle};
use catalog_db::repositories::{ArticleRepo, AssociationRepo, DocumentRepo, ImageRepo};
use catalog_db::{DbPool, DbTransaction};
use validator::{Validate, ValidationError};

use super::assets::{retire_documents, retire_images, settle, WrittenAssets};
use super::{group_by, required, taken};
use crate::error::AppResult;

/// 99999999.99, the largest value a `NUMERIC(10, 2)` price column holds.
const MAX_BASE_PRICE: Amount = Amount::from_parts(1_410_065_407, 2, 0, false, 2);

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Article",
        id,
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Article input as received from the client, before parsing.
///
/// Text fields are `None` when absent and `Some("")` when sent empty, which
/// the required fields reject on update as well as create. `suppliers` is `None`
/// when the field was not sent at all and `Some(vec![])` when it was sent
/// empty, which detaches every supplier on update.
#[derive(Debug, Default, Validate)]
pub struct ArticleForm {
    #[validate(length(
        max = MAX_NAME_LEN,
        message = "The external_id may not be greater than 255 characters."
    ))]
    pub external_id: Option<String>,
    #[validate(length(
        max = MAX_NAME_LEN,
        message = "The name may not be greater than 255 characters."
    ))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<String>,
    pub tax_category: Option<String>,
    pub tax_percentage: Option<String>,
    pub images: Vec<UploadedFile>,
    pub documents: Vec<UploadedFile>,
    pub suppliers: Option<Vec<String>>,
}

/// A validated article ready to insert.
#[derive(Debug)]
pub struct NewArticle {
    pub article: CreateArticle,
    pub images: Vec<AcceptedUpload>,
    pub documents: Vec<AcceptedUpload>,
    pub suppliers: Option<Vec<String>>,
}

/// A validated partial update.
#[derive(Debug)]
pub struct ArticleChanges {
    pub article: UpdateArticle,
    /// Non-empty replaces every existing image.
    pub images: Vec<AcceptedUpload>,
    /// Non-empty replaces every existing document.
    pub documents: Vec<AcceptedUpload>,
    pub suppliers: Option<Vec<String>>,
}

/// Parsed values of the form; absent fields stay `None`.
struct ParsedFields {
    external_id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    base_price: Option<Amount>,
    tax_category: Option<TaxCategory>,
    tax_percentage: Option<Amount>,
    images: Vec<AcceptedUpload>,
    documents: Vec<AcceptedUpload>,
    suppliers: Option<Vec<String>>,
}

fn rejection_message(err: ValidationError) -> String {
    err.message
        .map(|m| m.to_string())
        .unwrap_or_else(|| err.code.to_string())
}

fn parse_amount(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
    check: fn(&Amount) -> Result<(), ValidationError>,
) -> Option<Amount> {
    let text = value?;
    let Ok(amount) = Amount::from_str(text.trim()) else {
        errors.add(field, format!("The {field} field must be a number."));
        return None;
    };
    if let Err(e) = check(&amount) {
        errors.add(field, rejection_message(e));
        return None;
    }
    Some(amount)
}

/// A required field sent empty is an error even where it may be omitted.
fn non_empty(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    match value {
        Some(text) if text.is_empty() => {
            required(errors, field);
            None
        }
        other => other,
    }
}

fn check_uploads(
    errors: &mut FieldErrors,
    kind: AssetKind,
    field: &str,
    files: Vec<UploadedFile>,
) -> Vec<AcceptedUpload> {
    let mut accepted = Vec::with_capacity(files.len());
    for (index, file) in files.into_iter().enumerate() {
        match check_upload(kind, file) {
            Ok(upload) => accepted.push(upload),
            Err(message) => errors.add(&format!("{field}.{index}"), message),
        }
    }
    accepted
}

impl ArticleForm {
    fn parse(self, errors: &mut FieldErrors) -> ParsedFields {
        if let Err(e) = self.validate() {
            errors.merge(FieldErrors::from(&e));
        }

        let external_id = non_empty(errors, "external_id", self.external_id);
        let name = non_empty(errors, "name", self.name);
        let description = self.description.filter(|text| !text.is_empty());
        let base_price_text = non_empty(errors, "base_price", self.base_price);
        let tax_category_text = non_empty(errors, "tax_category", self.tax_category);
        let tax_percentage_text = non_empty(errors, "tax_percentage", self.tax_percentage);

        let base_price = parse_amount(
            errors,
            "base_price",
            base_price_text.as_deref(),
            validate_non_negative,
        );
        if let Some(price) = base_price {
            if price > MAX_BASE_PRICE {
                errors.add(
                    "base_price",
                    format!("The base_price may not be greater than {MAX_BASE_PRICE}."),
                );
            }
        }
        let tax_percentage = parse_amount(
            errors,
            "tax_percentage",
            tax_percentage_text.as_deref(),
            validate_percentage,
        );
        let tax_category = tax_category_text
            .as_deref()
            .and_then(|value| match value.parse::<TaxCategory>() {
                Ok(category) => Some(category),
                Err(_) => {
                    errors.add("tax_category", "The selected tax_category is invalid.");
                    None
                }
            });

        let images = check_uploads(errors, AssetKind::Image, "images", self.images);
        let documents = check_uploads(errors, AssetKind::Document, "documents", self.documents);

        ParsedFields {
            external_id,
            name,
            description,
            base_price,
            tax_category,
            tax_percentage,
            images,
            documents,
            suppliers: self.suppliers,
        }
    }

    /// Validate for creation. `errors` may already hold findings (such as a
    /// taken external id) and is returned together with any new ones.
    pub fn into_create(self, mut errors: FieldErrors) -> Result<NewArticle, CoreError> {
        let missing: Vec<&str> = [
            ("external_id", self.external_id.is_none()),
            ("name", self.name.is_none()),
            ("base_price", self.base_price.is_none()),
            ("tax_category", self.tax_category.is_none()),
            ("tax_percentage", self.tax_percentage.is_none()),
        ]
        .into_iter()
        .filter_map(|(field, absent)| absent.then_some(field))
        .collect();
        for field in missing {
            required(&mut errors, field);
        }

        let parsed = self.parse(&mut errors);
        match (
            parsed.external_id,
            parsed.name,
            parsed.base_price,
            parsed.tax_category,
            parsed.tax_percentage,
        ) {
            (Some(external_id), Some(name), Some(base_price), Some(tax_category), Some(tax_percentage))
                if errors.is_empty() =>
            {
                Ok(NewArticle {
                    article: CreateArticle {
                        external_id,
                        name,
                        description: parsed.description,
                        base_price,
                        tax_category,
                        tax_percentage,
                    },
                    images: parsed.images,
                    documents: parsed.documents,
                    suppliers: parsed.suppliers,
                })
            }
            _ => Err(CoreError::InvalidFields(errors)),
        }
    }

    /// Validate for a partial update: only present fields are checked.
    pub fn into_update(self, mut errors: FieldErrors) -> Result<ArticleChanges, CoreError> {
        let parsed = self.parse(&mut errors);
        errors.into_result()?;
        Ok(ArticleChanges {
            article: UpdateArticle {
                external_id: parsed.external_id,
                name: parsed.name,
                description: parsed.description,
                base_price: parsed.base_price,
                tax_category: parsed.tax_category,
                tax_percentage: parsed.tax_percentage,
            },
            images: parsed.images,
            documents: parsed.documents,
            suppliers: parsed.suppliers,
        })
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Create an article with its files and supplier links in one transaction.
pub async fn create_article(
    pool: &DbPool,
    store: &dyn AssetStore,
    form: ArticleForm,
) -> AppResult<ArticleDetail> {
    let mut errors = FieldErrors::new();
    if let Some(external_id) = form.external_id.as_deref().filter(|id| !id.is_empty()) {
        if ArticleRepo::external_id_taken(pool, external_id, None).await? {
            taken(&mut errors, "external_id");
        }
    }
    let input = form.into_create(errors)?;

    let mut tx = pool.begin().await?;
    let mut written = WrittenAssets::new(store);
    let outcome = insert_article(&mut tx, &mut written, &input).await;
    let article_id = settle(tx, written, outcome).await?;

    tracing::debug!(
        article_id,
        images = input.images.len(),
        documents = input.documents.len(),
        "Article created"
    );
    get_article(pool, article_id).await
}

async fn insert_article(
    tx: &mut DbTransaction<'_>,
    written: &mut WrittenAssets<'_>,
    input: &NewArticle,
) -> AppResult<DbId> {
    let article = ArticleRepo::create(tx, &input.article).await?;
    written.store_images(tx, article.id, &input.images).await?;
    written
        .store_documents(tx, article.id, &input.documents)
        .await?;
    if let Some(external_ids) = &input.suppliers {
        AssociationRepo::sync_suppliers_for_article(tx, article.id, external_ids).await?;
    }
    Ok(article.id)
}

/// Load one article with images, documents and supplier summaries.
pub async fn get_article(pool: &DbPool, id: DbId) -> AppResult<ArticleDetail> {
    let article = ArticleRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    load_detail(pool, article).await
}

async fn load_detail(pool: &DbPool, article: Article) -> AppResult<ArticleDetail> {
    let images = ImageRepo::list_for_article(pool, article.id).await?;
    let documents = DocumentRepo::list_for_article(pool, article.id).await?;
    let suppliers = AssociationRepo::suppliers_for_article(pool, article.id).await?;
    Ok(ArticleDetail {
        article,
        images,
        documents,
        suppliers,
    })
}

/// Apply a partial update. Uploaded images (documents) replace all existing
/// ones; a present supplier list replaces all links.
pub async fn update_article(
    pool: &DbPool,
    store: &dyn AssetStore,
    id: DbId,
    form: ArticleForm,
) -> AppResult<ArticleDetail> {
    ArticleRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let mut errors = FieldErrors::new();
    if let Some(external_id) = form.external_id.as_deref().filter(|id| !id.is_empty()) {
        if ArticleRepo::external_id_taken(pool, external_id, Some(id)).await? {
            taken(&mut errors, "external_id");
        }
    }
    let changes = form.into_update(errors)?;

    let mut tx = pool.begin().await?;
    let mut written = WrittenAssets::new(store);
    let outcome = apply_changes(&mut tx, &mut written, store, id, &changes).await;
    settle(tx, written, outcome).await?;

    tracing::debug!(
        article_id = id,
        images_replaced = !changes.images.is_empty(),
        documents_replaced = !changes.documents.is_empty(),
        suppliers_synced = changes.suppliers.is_some(),
        "Article updated"
    );
    get_article(pool, id).await
}

async fn apply_changes(
    tx: &mut DbTransaction<'_>,
    written: &mut WrittenAssets<'_>,
    store: &dyn AssetStore,
    id: DbId,
    changes: &ArticleChanges,
) -> AppResult<()> {
    ArticleRepo::find_for_update(tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    ArticleRepo::update(tx, id, &changes.article)
        .await?
        .ok_or_else(|| not_found(id))?;

    if !changes.images.is_empty() {
        retire_images(tx, store, id).await?;
        written.store_images(tx, id, &changes.images).await?;
    }
    if !changes.documents.is_empty() {
        retire_documents(tx, store, id).await?;
        written.store_documents(tx, id, &changes.documents).await?;
    }
    if let Some(external_ids) = &changes.suppliers {
        AssociationRepo::sync_suppliers_for_article(tx, id, external_ids).await?;
    }
    Ok(())
}

/// Delete an article, its files and its links.
pub async fn delete_article(pool: &DbPool, store: &dyn AssetStore, id: DbId) -> AppResult<()> {
    let mut tx = pool.begin().await?;
    let outcome = remove_article(&mut tx, store, id).await;
    settle(tx, WrittenAssets::new(store), outcome).await?;
    tracing::debug!(article_id = id, "Article deleted");
    Ok(())
}

async fn remove_article(
    tx: &mut DbTransaction<'_>,
    store: &dyn AssetStore,
    id: DbId,
) -> AppResult<()> {
    ArticleRepo::find_for_update(tx, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    retire_images(tx, store, id).await?;
    retire_documents(tx, store, id).await?;
    ArticleRepo::delete(tx, id).await?;
    Ok(())
}

/// Every article with its details, ordered by id.
pub async fn list_articles(pool: &DbPool) -> AppResult<Vec<ArticleDetail>> {
    let articles = ArticleRepo::list(pool).await?;
    let ids: Vec<DbId> = articles.iter().map(|a| a.id).collect();

    let mut images = group_by(ImageRepo::list_for_articles(pool, &ids).await?, |i| {
        i.article_id
    });
    let mut documents = group_by(DocumentRepo::list_for_articles(pool, &ids).await?, |d| {
        d.article_id
    });
    let mut suppliers = group_by(
        AssociationRepo::suppliers_for_articles(pool, &ids).await?,
        |l| l.article_id,
    );

    Ok(articles
        .into_iter()
        .map(|article| {
            let id = article.id;
            ArticleDetail {
                article,
                images: images.remove(&id).unwrap_or_default(),
                documents: documents.remove(&id).unwrap_or_default(),
                suppliers: suppliers
                    .remove(&id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|link| link.supplier)
                    .collect(),
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    fn complete_form() -> ArticleForm {
        ArticleForm {
            external_id: Some("ART-1".into()),
            name: Some("Chair".into()),
            base_price: Some("49.90".into()),
            tax_category: Some("reduced".into()),
            tax_percentage: Some("10".into()),
            ..Default::default()
        }
    }

    fn file(name: &str, data: &[u8]) -> UploadedFile {
        UploadedFile {
            original_name: name.into(),
            declared_mime: None,
            data: data.to_vec(),
        }
    }

    fn field_errors(err: CoreError) -> FieldErrors {
        match err {
            CoreError::InvalidFields(errors) => errors,
            other => panic!("expected InvalidFields, got {other:?}"),
        }
    }

    #[test]
    fn complete_form_is_accepted() {
        let input = complete_form().into_create(FieldErrors::new()).unwrap();
        assert_eq!(input.article.tax_category, TaxCategory::Reduced);
        assert_eq!(input.article.base_price, Amount::from_str("49.90").unwrap());
        assert!(input.suppliers.is_none());
    }

    #[test]
    fn create_reports_every_missing_field() {
        let errors = field_errors(ArticleForm::default().into_create(FieldErrors::new()).unwrap_err());
        for field in ["external_id", "name", "base_price", "tax_category", "tax_percentage"] {
            assert!(errors.contains(field), "{field} should be required");
        }
        assert!(!errors.contains("description"));
    }

    #[test]
    fn numeric_rules() {
        let form = ArticleForm {
            base_price: Some("-1".into()),
            tax_percentage: Some("100.5".into()),
            ..complete_form()
        };
        let errors = field_errors(form.into_create(FieldErrors::new()).unwrap_err());
        assert!(errors.contains("base_price"));
        assert!(errors.contains("tax_percentage"));

        let form = ArticleForm {
            base_price: Some("cheap".into()),
            ..complete_form()
        };
        let errors = field_errors(form.into_create(FieldErrors::new()).unwrap_err());
        assert_eq!(
            errors.get("base_price").unwrap(),
            ["The base_price field must be a number."]
        );

        let form = ArticleForm {
            base_price: Some("100000000".into()),
            ..complete_form()
        };
        assert_matches!(
            form.into_create(FieldErrors::new()),
            Err(CoreError::InvalidFields(errors)) if errors.contains("base_price")
        );
    }

    #[test]
    fn unknown_tax_category_is_rejected() {
        let form = ArticleForm {
            tax_category: Some("luxury".into()),
            ..complete_form()
        };
        let errors = field_errors(form.into_create(FieldErrors::new()).unwrap_err());
        assert!(errors.contains("tax_category"));
    }

    #[test]
    fn long_name_is_rejected() {
        let form = ArticleForm {
            name: Some("x".repeat(256)),
            ..complete_form()
        };
        let errors = field_errors(form.into_create(FieldErrors::new()).unwrap_err());
        assert!(errors.contains("name"));
    }

    #[test]
    fn bad_uploads_are_keyed_by_position() {
        let form = ArticleForm {
            images: vec![file("ok.png", PNG_MAGIC), file("bad.bmp", b"BM")],
            documents: vec![file("virus.exe", b"MZ")],
            ..complete_form()
        };
        let errors = field_errors(form.into_create(FieldErrors::new()).unwrap_err());
        assert!(!errors.contains("images.0"));
        assert!(errors.contains("images.1"));
        assert!(errors.contains("documents.0"));
    }

    #[test]
    fn prior_errors_are_kept() {
        let mut prior = FieldErrors::new();
        taken(&mut prior, "external_id");
        let errors = field_errors(complete_form().into_create(prior).unwrap_err());
        assert_eq!(
            errors.get("external_id").unwrap(),
            ["The external_id has already been taken."]
        );
    }

    #[test]
    fn update_checks_only_present_fields() {
        let changes = ArticleForm {
            name: Some("New name".into()),
            suppliers: Some(Vec::new()),
            ..Default::default()
        }
        .into_update(FieldErrors::new())
        .unwrap();
        assert_eq!(changes.article.name.as_deref(), Some("New name"));
        assert!(changes.article.base_price.is_none());
        assert_eq!(changes.suppliers, Some(Vec::new()));

        let err = ArticleForm {
            tax_percentage: Some("-3".into()),
            ..Default::default()
        }
        .into_update(FieldErrors::new())
        .unwrap_err();
        assert!(field_errors(err).contains("tax_percentage"));
    }

    #[test]
    fn empty_required_field_is_rejected_on_update() {
        let err = ArticleForm {
            name: Some(String::new()),
            external_id: Some(String::new()),
            ..Default::default()
        }
        .into_update(FieldErrors::new())
        .unwrap_err();
        let errors = field_errors(err);
        assert_eq!(errors.get("name").unwrap(), ["The name field is required."]);
        assert!(errors.contains("external_id"));

        let changes = ArticleForm {
            description: Some(String::new()),
            ..Default::default()
        }
        .into_update(FieldErrors::new())
        .unwrap();
        assert!(changes.article.description.is_none());
    }

    #[test]
    fn empty_required_field_on_create_is_reported_once() {
        let form = ArticleForm {
            name: Some(String::new()),
            ..complete_form()
        };
        let errors = field_errors(form.into_create(FieldErrors::new()).unwrap_err());
        assert_eq!(errors.get("name").unwrap(), ["The name field is required."]);
    }
}
