use crate::api::{DashboardClient, RequestOptions};
use crate::error::FetchError;
use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use tracing::info;

/// A company as listed by `/api/companies`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Company {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub email_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct CompanyList {
    data: Vec<Company>,
}

#[derive(Debug, Deserialize)]
struct CompanyEnvelope {
    data: Company,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyFormError {
    MissingName,
}

impl std::fmt::Display for CompanyFormError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => write!(f, "A cégnév megadása kötelező"),
        }
    }
}

impl std::error::Error for CompanyFormError {}

/// Validated create/update payload
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompanyForm {
    name: String,
    emails: Vec<String>,
}

impl CompanyForm {
    /// Trim everything, require a name, drop blank addresses.
    pub fn try_new<S: AsRef<str>>(name: &str, emails: &[S]) -> Result<Self, CompanyFormError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CompanyFormError::MissingName);
        }

        Ok(Self {
            name: name.to_string(),
            emails: emails
                .iter()
                .map(|e| e.as_ref().trim())
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn emails(&self) -> &[String] {
        &self.emails
    }
}

impl DashboardClient {
    pub async fn list_companies(&self) -> Result<Vec<Company>, FetchError> {
        let list: CompanyList = self.request("/api/companies", RequestOptions::get()).await?;
        Ok(list.data)
    }

    pub async fn get_company(&self, id: i64) -> Result<Company, FetchError> {
        let path = format!("/api/companies/{}", id);
        let envelope: CompanyEnvelope = self.request(&path, RequestOptions::get()).await?;
        Ok(envelope.data)
    }

    pub async fn create_company(&self, form: &CompanyForm) -> Result<Company, FetchError> {
        let envelope: CompanyEnvelope = self
            .request("/api/companies", RequestOptions::post_json(form)?)
            .await?;
        info!(id = envelope.data.id, name = %envelope.data.name, "Company created");
        Ok(envelope.data)
    }

    pub async fn update_company(&self, id: i64, form: &CompanyForm) -> Result<Company, FetchError> {
        let path = format!("/api/companies/{}", id);
        let envelope: CompanyEnvelope = self.request(&path, RequestOptions::put_json(form)?).await?;
        info!(id, name = %envelope.data.name, "Company updated");
        Ok(envelope.data)
    }

    pub async fn delete_company(&self, id: i64) -> Result<(), FetchError> {
        let path = format!("/api/companies/{}", id);
        let _: IgnoredAny = self.request(&path, RequestOptions::delete()).await?;
        info!(id, "Company deleted");
        Ok(())
    }
}

/// Case-insensitive search over name and addresses
pub fn filter_companies<'a>(companies: &'a [Company], term: &str) -> Vec<&'a Company> {
    let needle = term.trim().to_lowercase();
    companies
        .iter()
        .filter(|c| {
            needle.is_empty()
                || c.name.to_lowercase().contains(&needle)
                || c.emails.iter().any(|e| e.to_lowercase().contains(&needle))
        })
        .collect()
}
