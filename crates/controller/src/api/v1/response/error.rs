//! Error response types for REST APIv1
use super::{
    CODE_INVALID_EMAIL, CODE_INVALID_LENGTH, CODE_INVALID_URL, CODE_INVALID_VALUE,
    CODE_MISSING_VALUE, CODE_OUT_OF_RANGE, CODE_VALUE_REQUIRED,
};
use actix_web::error::JsonPayloadError;
use actix_web::http::header::HeaderValue;
use actix_web::http::{header, StatusCode};
use actix_web::HttpRequest;
use actix_web::{body::BoxBody, HttpResponse, ResponseError};
use database::DatabaseError;
use diesel::result::DatabaseErrorKind;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use validator::ValidationErrors;

/// Error handler for the actix JSON extractor
///
/// Gets called when an incoming request results in a [`JsonPayloadError`].
/// Returns a `Bad Request` [`ApiError`] error with an appropriate error
/// code and message.
pub fn json_error_handler(err: JsonPayloadError, _: &HttpRequest) -> actix_web::error::Error {
    let error_code = match err {
        JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
            "payload_overflow"
        }
        JsonPayloadError::ContentType => "invalid_content_type",
        JsonPayloadError::Deserialize(_) | JsonPayloadError::Serialize(_) => "invalid_json",
        _ => "invalid_payload",
    };
    ApiError::bad_request()
        .with_code(error_code)
        .with_message(err.to_string())
        .into()
}

#[derive(Debug, Serialize)]
struct StandardErrorBody {
    // Machine readable error code
    code: Cow<'static, str>,
    // Human readable message
    message: Cow<'static, str>,
}

#[derive(Debug, Serialize)]
pub struct ValidationErrorEntry {
    /// The field related to the error
    /// It's a struct level error when no field is set
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<Cow<'static, str>>,
    /// Machine readable error code
    code: Cow<'static, str>,
    /// Human readable error message
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<Cow<'static, str>>,
}

impl ValidationErrorEntry {
    pub fn new<F, C, M>(field: F, code: C, message: Option<M>) -> Self
    where
        F: Into<Cow<'static, str>>,
        C: Into<Cow<'static, str>>,
        M: Into<Cow<'static, str>>,
    {
        Self {
            field: Some(field.into()),
            code: code.into(),
            message: message.map(|m| m.into()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ValidationErrorBody {
    /// Machine readable error code
    code: Cow<'static, str>,
    // Human readable message
    message: Cow<'static, str>,
    // A list of validation errors
    errors: Vec<ValidationErrorEntry>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ErrorBody {
    /// The standard error body
    Standard(StandardErrorBody),
    /// Special error body for validation errors
    Validation(ValidationErrorBody),
}

/// The default REST API error
///
/// Can be built via the associated functions to represent various HTTP
/// errors. Each HTTP error has their default error code and message that
/// get sent in a JSON body. The error code and message can be overwritten
/// when creating an error.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new_standard<T>(status: StatusCode, code: T, message: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        Self {
            status,
            body: ErrorBody::Standard(StandardErrorBody {
                code: code.into(),
                message: message.into(),
            }),
        }
    }

    /// Override the default code for an error
    pub fn with_code<T>(mut self, code: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        match &mut self.body {
            ErrorBody::Standard(std) => std.code = code.into(),
            ErrorBody::Validation(val) => val.code = code.into(),
        }

        self
    }

    /// Override the default message for an error
    pub fn with_message<T>(mut self, message: T) -> Self
    where
        T: Into<Cow<'static, str>>,
    {
        match &mut self.body {
            ErrorBody::Standard(std) => std.message = message.into(),
            ErrorBody::Validation(val) => val.message = message.into(),
        }

        self
    }

    /// Create a new 400 Bad Request error
    pub fn bad_request() -> Self {
        Self::new_standard(
            StatusCode::BAD_REQUEST,
            "bad_request",
            "Invalid request due to malformed syntax",
        )
    }

    /// Create a new 401 Unauthorized error
    pub fn unauthorized() -> Self {
        Self::new_standard(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Authentication failed",
        )
    }

    /// Create a new 404 Not Found error
    pub fn not_found() -> Self {
        Self::new_standard(
            StatusCode::NOT_FOUND,
            "not_found",
            "A requested resource could not be found",
        )
    }

    /// Create a new 409 Conflict error
    pub fn conflict() -> Self {
        Self::new_standard(
            StatusCode::CONFLICT,
            "conflict",
            "The request conflicts with the state of the resource",
        )
    }

    /// Create a new 422 Unprocessable Entity error
    ///
    /// This error is normally created from [`ValidationErrors`] from the
    /// validator crate. The JSON body for this error additionally contains
    /// a list of errors for each invalid field.
    pub fn unprocessable_entities<I>(errors: I) -> Self
    where
        I: IntoIterator<Item = ValidationErrorEntry>,
    {
        let errors = errors.into_iter().collect();

        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: ErrorBody::Validation(ValidationErrorBody {
                code: "validation_failed".into(),
                message: "Some provided values are invalid".into(),
                errors,
            }),
        }
    }

    /// Create a new 502 Bad Gateway error
    ///
    /// Used when an upstream collaborator (geocoding) is unavailable or
    /// misbehaves.
    pub fn bad_gateway() -> Self {
        Self::new_standard(
            StatusCode::BAD_GATEWAY,
            "upstream_error",
            "An upstream service could not fulfill the request",
        )
    }

    /// Create a new 500 Internal Server Error
    pub fn internal() -> Self {
        Self::new_standard(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_server_error",
            "An internal server error occurred",
        )
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            ErrorBody::Standard(StandardErrorBody { code, message }) => {
                write!(
                    f,
                    "status={}, code={}, message={}",
                    self.status, code, message
                )
            }
            ErrorBody::Validation(ValidationErrorBody {
                code,
                message,
                errors,
            }) => {
                write!(
                    f,
                    "status={}, code={}, message={}, errors={}",
                    self.status,
                    code,
                    message,
                    serde_json::to_string(errors)
                        .unwrap_or_else(|_| "unserializable errors".to_string())
                )
            }
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let mut response = HttpResponse::new(self.status_code());

        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/json; charset=utf-8"),
        );

        let body = serde_json::to_string(&self.body).expect("Unable to serialize API error body");

        response.set_body(BoxBody::new(body))
    }
}

impl From<crate::BlockingError> for ApiError {
    fn from(e: crate::BlockingError) -> Self {
        log::error!("REST API threw internal error from blocking error: {}", e);
        Self::internal()
    }
}

impl From<actix_web::Error> for ApiError {
    fn from(e: actix_web::Error) -> Self {
        log::error!("REST API threw internal error from actix web error: {}", e);
        Self::internal()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        log::error!("REST API threw internal error from anyhow error: {:?}", e);
        Self::internal()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(db_error: DatabaseError) -> Self {
        match db_error {
            DatabaseError::NotFound => Self::not_found(),
            DatabaseError::DieselError(diesel::result::Error::DatabaseError(
                DatabaseErrorKind::ForeignKeyViolation,
                _,
            )) => Self::conflict(),
            e => {
                log::error!("REST API threw internal error from database error: {}", e);
                Self::internal()
            }
        }
    }
}

impl From<crate::geocode::Error> for ApiError {
    fn from(e: crate::geocode::Error) -> Self {
        match e {
            crate::geocode::Error::NoMatch => {
                Self::not_found().with_code("address_not_found").with_message(
                    "The provided address could not be resolved to coordinates",
                )
            }
            e => {
                log::error!("Geocoding upstream failure: {}", e);
                Self::bad_gateway()
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    /// Creates a 422 Unprocessable entity response from the [`ValidationErrors`]
    ///
    /// Nested struct errors are flattened; field names of nested fields are
    /// reported as if they were top level.
    fn from(validation_errors: ValidationErrors) -> Self {
        let mut entries = Vec::with_capacity(validation_errors.errors().len());

        collect_validation_errors(validation_errors, &mut entries);

        Self::unprocessable_entities(entries)
    }
}

/// Convert [`ValidationErrors`] into multiple
/// [`ValidationErrorEntries`](ValidationErrorEntry) and collect them in
/// `entries`
fn collect_validation_errors(
    validation_errors: ValidationErrors,
    entries: &mut Vec<ValidationErrorEntry>,
) {
    let errors = validation_errors.into_errors();

    for (field, error_kind) in errors {
        let field = match field {
            "__all__" => None,
            field => Some(field.into()),
        };

        match error_kind {
            validator::ValidationErrorsKind::Field(v) => {
                for error in v {
                    let code = convert_validation_code(&error.code);

                    entries.push(ValidationErrorEntry {
                        field: field.clone(),
                        code: Cow::Borrowed(code),
                        message: error.message,
                    });
                }
            }
            validator::ValidationErrorsKind::Struct(inner_errors) => {
                collect_validation_errors(*inner_errors.to_owned(), entries);
            }
            validator::ValidationErrorsKind::List(list) => {
                let invalid_indexes = list
                    .keys()
                    .take(15)
                    .map(|idx| idx.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");

                let message = format!("Invalid values at index {invalid_indexes}");

                entries.push(ValidationErrorEntry {
                    field,
                    code: "invalid_values".into(),
                    message: Some(Cow::Owned(message)),
                })
            }
        };
    }
}

fn convert_validation_code(code: &str) -> &'static str {
    match code {
        "email" => CODE_INVALID_EMAIL,
        "url" => CODE_INVALID_URL,
        "length" => CODE_INVALID_LENGTH,
        "range" => CODE_OUT_OF_RANGE,
        "required" => CODE_VALUE_REQUIRED,
        "empty" => CODE_MISSING_VALUE,
        _ => CODE_INVALID_VALUE,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct ValidationTester {
        #[validate(email)]
        mail: String,
        #[validate(length(max = 5))]
        length: String,
        #[validate(range(min = 5.0, max = 10.0))]
        range: f64,
    }

    #[test]
    fn api_validation_error() {
        let tester = ValidationTester {
            mail: "not_a_mail".into(),
            length: "looong".into(),
            range: 11.0,
        };

        let mut api_error = match tester.validate() {
            Ok(_) => panic!("Validation should fail"),
            Err(err) => ApiError::from(err),
        };

        assert_eq!(api_error.status, StatusCode::UNPROCESSABLE_ENTITY);

        match &mut api_error.body {
            ErrorBody::Standard(_) => panic!("Expected validation error body"),
            ErrorBody::Validation(val) => {
                val.errors.sort_by(|a, b| a.field.cmp(&b.field));

                assert_eq!(
                    serde_json::to_value(&val.errors).unwrap(),
                    json!([
                        { "field": "length", "code": "invalid_length" },
                        { "field": "mail", "code": "invalid_email" },
                        { "field": "range", "code": "out_of_range" },
                    ])
                );
            }
        }
    }

    #[test]
    fn api_error_with_code() {
        let error = ApiError::not_found().with_code("custom_code");

        assert_eq!(
            serde_json::to_value(&error.body).unwrap(),
            json!({
                "code": "custom_code",
                "message": "A requested resource could not be found"
            })
        );
    }

    #[test]
    fn api_error_with_message() {
        let error = ApiError::not_found().with_message("A custom message");

        assert_eq!(
            serde_json::to_value(&error.body).unwrap(),
            json!({
                "code": "not_found",
                "message": "A custom message"
            })
        );
    }
}
