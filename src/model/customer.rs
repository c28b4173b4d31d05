//! Customer and document types

use super::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A customer row from the list endpoint (lightweight)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerSummary {
    pub id: Id,
    #[serde(default)]
    pub company_name: String,
    pub name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub document_count: u32,
}

/// Full customer record including attached documents
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub id: Id,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
    pub name: String,
    #[serde(default)]
    pub name_kana: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub fax: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub business_card_front_url: Option<String>,
    #[serde(default)]
    pub business_card_back_url: Option<String>,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// "Company - Name" when a company is set
    pub fn label(&self) -> String {
        if self.company_name.is_empty() {
            self.name.clone()
        } else {
            format!("{} - {}", self.company_name, self.name)
        }
    }

    pub fn to_draft(&self) -> CustomerDraft {
        CustomerDraft {
            company_name: self.company_name.clone(),
            department: self.department.clone(),
            position: self.position.clone(),
            name: self.name.clone(),
            name_kana: self.name_kana.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            mobile: self.mobile.clone(),
            fax: self.fax.clone(),
            postal_code: self.postal_code.clone(),
            address: self.address.clone(),
            website: self.website.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Create/update payload for a customer
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct CustomerDraft {
    pub company_name: String,
    pub department: String,
    pub position: String,
    pub name: String,
    pub name_kana: String,
    pub email: String,
    pub phone: String,
    pub mobile: String,
    pub fax: String,
    pub postal_code: String,
    pub address: String,
    pub website: String,
    pub notes: String,
}

impl CustomerDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A file attached to a customer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: Id,
    pub customer: Id,
    #[serde(default)]
    pub category: DocumentCategory,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Estimate,
    Proposal,
    Invoice,
    Contract,
    WebData,
    Photo,
    #[default]
    Other,
}

impl DocumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Estimate => "estimate",
            DocumentCategory::Proposal => "proposal",
            DocumentCategory::Invoice => "invoice",
            DocumentCategory::Contract => "contract",
            DocumentCategory::WebData => "web_data",
            DocumentCategory::Photo => "photo",
            DocumentCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "estimate" => Ok(DocumentCategory::Estimate),
            "proposal" => Ok(DocumentCategory::Proposal),
            "invoice" => Ok(DocumentCategory::Invoice),
            "contract" => Ok(DocumentCategory::Contract),
            "web_data" | "web-data" => Ok(DocumentCategory::WebData),
            "photo" => Ok(DocumentCategory::Photo),
            "other" => Ok(DocumentCategory::Other),
            other => Err(format!("unknown document category: {}", other)),
        }
    }
}

/// Multipart upload of a document file
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub customer: Id,
    pub category: DocumentCategory,
    pub title: String,
    pub file: PathBuf,
    pub description: String,
}

/// Business card images; either side may be omitted
#[derive(Debug, Clone, Default)]
pub struct BusinessCardUpload {
    pub front: Option<PathBuf>,
    pub back: Option<PathBuf>,
}

impl BusinessCardUpload {
    pub fn is_empty(&self) -> bool {
        self.front.is_none() && self.back.is_none()
    }
}
