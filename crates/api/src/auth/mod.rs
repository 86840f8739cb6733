//! Credentials and bearer tokens: [`password`] hashes what users register
//! with, [`jwt`] issues and checks what they present afterwards.

pub mod jwt;
pub mod password;
