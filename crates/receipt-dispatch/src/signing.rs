//! Signature flow submission.
//!
//! One `POST /subscriptionFlow` per document, sent as a multipart form with
//! the PDF attached. Signatories sign in the order they appear in the form.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDateTime};
use reqwest::multipart::{Form, Part};
use routing::{FolderId, RosterEntry};
use tracing::debug;

use crate::auth::BearerToken;
use crate::config::{DirectorConfig, SigningConfig};
use crate::flow::FlowKind;

const DEADLINE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Signature role "signer" in the service's catalogue.
const SIGN_AS_SIGNER: &str = "1";
const GROUP_NONE: &str = "0";

/// How the service authenticates a signatory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Email,
    WhatsApp,
}

impl AuthMethod {
    fn code(self) -> &'static str {
        match self {
            Self::Email => "1",
            Self::WhatsApp => "11",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signatory {
    pub name: String,
    pub tax_id: String,
    pub phone: Option<String>,
    pub email: String,
    pub auth: AuthMethod,
}

impl Signatory {
    fn employee(entry: &RosterEntry) -> Self {
        Self {
            name: entry.display_name.clone(),
            tax_id: entry.tax_id.clone(),
            phone: Some(entry.phone.clone()),
            email: entry.email.clone(),
            auth: AuthMethod::WhatsApp,
        }
    }

    fn director(director: &DirectorConfig) -> Self {
        Self {
            name: director.name.clone(),
            tax_id: director.tax_id.clone(),
            phone: None,
            email: director.email.clone(),
            auth: AuthMethod::Email,
        }
    }
}

/// Everything the dispatcher needs for one document.
#[derive(Debug, Clone, Copy)]
pub struct SignatureRequest<'a> {
    pub document: &'a Path,
    pub employee: &'a RosterEntry,
    pub folder: FolderId,
}

#[async_trait]
pub trait SigningDispatcher: Send + Sync {
    /// Start the signature flow; `Ok` only when the service accepted it.
    async fn dispatch(&self, request: SignatureRequest<'_>) -> Result<()>;
}

/// Signatories for `flow`, in signing order.
pub fn signatories(
    flow: FlowKind,
    employee: &RosterEntry,
    signing: &SigningConfig,
) -> Result<Vec<Signatory>> {
    match flow {
        FlowKind::Payroll => Ok(vec![Signatory::employee(employee)]),
        FlowKind::Vacation => {
            let director = signing
                .director
                .as_ref()
                .context("Vacation flow requires a director signatory")?;
            Ok(vec![Signatory::director(director), Signatory::employee(employee)])
        }
    }
}

fn message(flow: FlowKind, employee: &RosterEntry) -> String {
    match flow {
        FlowKind::Payroll => format!(
            "Olá {}, segue seu documento para assinatura via WhatsApp.",
            employee.display_name
        ),
        FlowKind::Vacation => format!(
            "Documento de Férias de {} para assinatura sequencial.",
            employee.display_name
        ),
    }
}

fn document_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .context("Document path has no file name")
}

/// Text fields of the submission form, in the order they are sent.
pub fn form_fields(
    flow: FlowKind,
    request: SignatureRequest<'_>,
    signing: &SigningConfig,
    now: NaiveDateTime,
) -> Result<Vec<(String, String)>> {
    let name = document_name(request.document)?;
    let deadline = Duration::try_days(signing.deadline_days)
        .and_then(|days| now.checked_add_signed(days))
        .with_context(|| {
            format!(
                "Signature deadline of {} days is out of range",
                signing.deadline_days
            )
        })?;

    let mut fields = vec![
        ("name".to_string(), name),
        ("folderId".to_string(), request.folder.to_string()),
        (
            "signatureLimitDate".to_string(),
            deadline.format(DEADLINE_FORMAT).to_string(),
        ),
        ("reminder".to_string(), "true".to_string()),
        ("reminderDays".to_string(), signing.reminder_days.to_string()),
        ("message".to_string(), message(flow, request.employee)),
    ];

    for (i, signer) in signatories(flow, request.employee, signing)?
        .into_iter()
        .enumerate()
    {
        let key = |field: &str| format!("signatories[{i}][{field}]");
        fields.push((key("name"), signer.name));
        fields.push((key("cpf"), signer.tax_id));
        if let Some(phone) = signer.phone {
            fields.push((key("phone"), phone));
        }
        fields.push((key("email"), signer.email));
        fields.push((key("signAsId"), SIGN_AS_SIGNER.to_string()));
        fields.push((
            key("requiredAuthenticationType"),
            signer.auth.code().to_string(),
        ));
        fields.push((key("groupId"), GROUP_NONE.to_string()));
    }
    Ok(fields)
}

/// Submits flows to the live `/subscriptionFlow` endpoint.
pub struct HttpSigningDispatcher {
    base_url: String,
    token: BearerToken,
    client: reqwest::Client,
    flow: FlowKind,
    signing: SigningConfig,
}

impl HttpSigningDispatcher {
    pub fn new(
        base_url: &str,
        token: BearerToken,
        client: reqwest::Client,
        flow: FlowKind,
        signing: SigningConfig,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            client,
            flow,
            signing,
        }
    }
}

#[async_trait]
impl SigningDispatcher for HttpSigningDispatcher {
    async fn dispatch(&self, request: SignatureRequest<'_>) -> Result<()> {
        let fields = form_fields(self.flow, request, &self.signing, Local::now().naive_local())?;

        let bytes = tokio::fs::read(request.document)
            .await
            .with_context(|| format!("Failed to read {}", request.document.display()))?;
        let file_name = document_name(request.document)?;
        let mut form = Form::new();
        for (key, value) in fields {
            form = form.text(key, value);
        }
        form = form.part(
            "file",
            Part::bytes(bytes)
                .file_name(file_name)
                .mime_str("application/pdf")?,
        );

        let url = format!("{}/subscriptionFlow", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.token.as_str())
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("Signature request to {url} failed"))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK && status != reqwest::StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Signature flow rejected with HTTP {status}: {body}");
        }

        debug!(document = %request.document.display(), folder = %request.folder, "Signature flow accepted");
        Ok(())
    }
}
