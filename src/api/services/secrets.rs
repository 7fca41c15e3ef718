//! Create and retrieve endpoints

use actix_web::http::StatusCode;
use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error};

use crate::crypto::SecretCipher;
use crate::errors::{Result, SecretLinksError};
use crate::services::{
    CreateLinkRequest, CreationService, EXPECTED_SECRET, RetrievalService, parse_optional_int,
};
use crate::utils::is_valid_key;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Externally visible origin used when rendering created links
///
/// `None` falls back to the scheme and Host of the incoming request.
#[derive(Clone, Debug, Default)]
pub struct LinkUrlBase(pub Option<String>);

impl LinkUrlBase {
    pub fn render(&self, req: &HttpRequest, key: &str) -> String {
        match &self.0 {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => {
                let info = req.connection_info();
                format!("{}://{}/{}", info.scheme(), info.host(), key)
            }
        }
    }
}

/// Form fields accepted by `/create`
///
/// Every field is optional here so that missing and malformed values can be
/// reported with the same messages regardless of encoding.
#[derive(Debug, Default, Deserialize)]
pub struct CreateForm {
    pub secret: Option<String>,
    #[serde(alias = "expirationMinutes")]
    pub expiration: Option<String>,
    #[serde(alias = "maxViews")]
    pub maxviews: Option<String>,
}

impl CreateForm {
    /// Body fields win over query fields
    fn merge(body: Option<Self>, query: Option<Self>) -> Self {
        let body = body.unwrap_or_default();
        let query = query.unwrap_or_default();
        Self {
            secret: body.secret.or(query.secret),
            expiration: body.expiration.or(query.expiration),
            maxviews: body.maxviews.or(query.maxviews),
        }
    }
}

pub struct SecretService;

impl SecretService {
    pub async fn create_link(
        req: HttpRequest,
        body: Option<web::Form<CreateForm>>,
        query: Option<web::Query<CreateForm>>,
        creation: web::Data<Arc<CreationService>>,
        cipher: web::Data<Arc<dyn SecretCipher>>,
        url_base: web::Data<LinkUrlBase>,
    ) -> impl Responder {
        let form = CreateForm::merge(
            body.map(web::Form::into_inner),
            query.map(web::Query::into_inner),
        );

        match Self::try_create(form, &creation, cipher.get_ref().as_ref()).await {
            Ok(key) => HttpResponse::Ok()
                .insert_header((CONTENT_TYPE, TEXT_PLAIN))
                .body(url_base.render(&req, &key)),
            Err(e) => error_response(&e),
        }
    }

    async fn try_create(
        form: CreateForm,
        creation: &CreationService,
        cipher: &dyn SecretCipher,
    ) -> Result<String> {
        let secret = form
            .secret
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SecretLinksError::validation(EXPECTED_SECRET))?;
        let ttl_minutes = parse_optional_int(form.expiration.as_deref())?;
        let max_views = parse_optional_int(form.maxviews.as_deref())?;

        let request = CreateLinkRequest {
            secret: cipher.encrypt(&secret)?,
            ttl_minutes,
            max_views,
        };
        Ok(creation.create(request).await?.key)
    }

    pub async fn retrieve_secret(
        path: web::Path<String>,
        retrieval: web::Data<Arc<RetrievalService>>,
        cipher: web::Data<Arc<dyn SecretCipher>>,
    ) -> impl Responder {
        let key = path.into_inner();

        // 非法短码直接 404，不访问存储
        if !is_valid_key(&key) {
            debug!("Rejected malformed key: {:?}", key);
            return error_response(&SecretLinksError::not_found("Not Found"));
        }

        let result = match retrieval.retrieve(&key).await {
            // 此时该次查看已计数，解密失败也不会退还
            Ok(served) => cipher.decrypt(&served.secret).inspect_err(|e| {
                error!(
                    "Failed to decrypt secret for '{}' after serving view {}/{} ({} left): {}",
                    key,
                    served.views,
                    served.max_views,
                    served.max_views.saturating_sub(served.views),
                    e
                );
            }),
            Err(e) => Err(e),
        };

        match result {
            Ok(plaintext) => HttpResponse::Ok()
                .insert_header((CONTENT_TYPE, TEXT_PLAIN))
                .insert_header((CACHE_CONTROL, "no-store"))
                .body(plaintext),
            Err(e) => error_response(&e),
        }
    }

    pub async fn method_not_allowed() -> impl Responder {
        HttpResponse::build(StatusCode::METHOD_NOT_ALLOWED)
            .insert_header((CONTENT_TYPE, TEXT_PLAIN))
            .body("Method not allowed")
    }
}

/// Map a service error onto the wire
///
/// Only client errors expose their message; everything else is logged and
/// reported as a bare 500.
pub fn error_response(err: &SecretLinksError) -> HttpResponse {
    let (status, body) = match err {
        SecretLinksError::Validation(msg) => (StatusCode::NOT_ACCEPTABLE, msg.as_str()),
        SecretLinksError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
        SecretLinksError::Gone(_) => (StatusCode::GONE, "Link expired"),
        _ => {
            error!("Request failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    };

    if err.is_client_error() {
        debug!("Client error {}: {}", status.as_u16(), err);
    }

    HttpResponse::build(status)
        .insert_header((CONTENT_TYPE, TEXT_PLAIN))
        .body(body.to_string())
}

pub fn secret_routes() -> actix_web::Scope {
    web::scope("")
        .service(
            web::resource("/create")
                .route(web::post().to(SecretService::create_link))
                .default_service(web::to(SecretService::method_not_allowed)),
        )
        .route("/{key}", web::get().to(SecretService::retrieve_secret))
}
