//! Customer and document endpoints

use super::{file_part, ApiClient, ClientError, ClientResult};
use crate::events::{Mutation, ResourceKind};
use crate::model::{
    BusinessCardUpload, Customer, CustomerDraft, CustomerSummary, Document, DocumentUpload, Id,
};
use reqwest::{multipart, Method};

impl ApiClient {
    /// List customers; a non-empty `search` filters by name, company, email or phone
    pub async fn list_customers(&self, search: Option<&str>) -> ClientResult<Vec<CustomerSummary>> {
        let query: Vec<(&str, String)> = match search.map(str::trim) {
            Some(term) if !term.is_empty() => vec![("search", term.to_string())],
            _ => Vec::new(),
        };
        self.get_json("customers/", &query, "Failed to load customers")
            .await
    }

    pub async fn get_customer(&self, id: Id) -> ClientResult<Customer> {
        self.get_json(&format!("customers/{}/", id), &[], "Failed to load customer")
            .await
    }

    pub async fn create_customer(&self, draft: &CustomerDraft) -> ClientResult<Customer> {
        if draft.name.trim().is_empty() {
            return Err(ClientError::InvalidInput("customer name is required".to_string()));
        }
        let customer: Customer = self
            .send_json(Method::POST, "customers/", draft, "Failed to create customer")
            .await?;
        self.notify(ResourceKind::Customers, Mutation::Created, Some(customer.id));
        Ok(customer)
    }

    pub async fn update_customer(&self, id: Id, draft: &CustomerDraft) -> ClientResult<Customer> {
        let customer: Customer = self
            .send_json(
                Method::PUT,
                &format!("customers/{}/", id),
                draft,
                "Failed to update customer",
            )
            .await?;
        self.notify(ResourceKind::Customers, Mutation::Updated, Some(id));
        Ok(customer)
    }

    pub async fn delete_customer(&self, id: Id) -> ClientResult<()> {
        self.delete(&format!("customers/{}/", id), "Failed to delete customer")
            .await?;
        self.notify(ResourceKind::Customers, Mutation::Deleted, Some(id));
        Ok(())
    }

    /// Upload business card images (multipart fields `front` / `back`)
    pub async fn upload_business_card(
        &self,
        id: Id,
        upload: &BusinessCardUpload,
    ) -> ClientResult<Customer> {
        if upload.is_empty() {
            return Err(ClientError::InvalidInput(
                "at least one business card side is required".to_string(),
            ));
        }

        let mut form = multipart::Form::new();
        if let Some(front) = &upload.front {
            form = form.part("front", file_part(front).await?);
        }
        if let Some(back) = &upload.back {
            form = form.part("back", file_part(back).await?);
        }

        let customer: Customer = self
            .send_multipart(
                Method::POST,
                &format!("customers/{}/upload-business-card/", id),
                form,
                "Failed to upload business card",
            )
            .await?;
        self.notify(ResourceKind::Customers, Mutation::Uploaded, Some(id));
        Ok(customer)
    }

    pub async fn list_documents(&self, customer: Id) -> ClientResult<Vec<Document>> {
        let query = [("customer", customer.to_string())];
        self.get_json("documents/", &query, "Failed to load documents")
            .await
    }

    pub async fn upload_document(&self, upload: &DocumentUpload) -> ClientResult<Document> {
        if upload.title.trim().is_empty() {
            return Err(ClientError::InvalidInput("document title is required".to_string()));
        }

        let form = multipart::Form::new()
            .text("customer", upload.customer.to_string())
            .text("category", upload.category.to_string())
            .text("title", upload.title.clone())
            .part("file", file_part(&upload.file).await?)
            .text("description", upload.description.clone());

        let document: Document = self
            .send_multipart(Method::POST, "documents/", form, "Failed to upload document")
            .await?;
        self.notify(ResourceKind::Documents, Mutation::Uploaded, Some(document.id));
        // Document counts on customer rows change too
        self.notify(ResourceKind::Customers, Mutation::Updated, Some(upload.customer));
        Ok(document)
    }

    pub async fn delete_document(&self, id: Id) -> ClientResult<()> {
        self.delete(&format!("documents/{}/", id), "Failed to delete document")
            .await?;
        self.notify(ResourceKind::Documents, Mutation::Deleted, Some(id));
        self.notify(ResourceKind::Customers, Mutation::Updated, None);
        Ok(())
    }
}
