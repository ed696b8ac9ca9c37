use poem_openapi::Object;
use serde::Serialize;

use crate::repository::RepositoryError;

#[derive(Debug, Serialize, Object)]
pub struct MyError {
    message: String,
}

impl MyError {
    pub fn new_error<E: std::fmt::Display>(message: E) -> Self {
        MyError {
            message: format!("{}", message),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[macro_export]
macro_rules! generate_error_response {
    ($enum_name:ident, $(($status:literal, $name:ident)),*) => {
        #[derive(Debug, poem_openapi::ApiResponse)]
        pub enum $enum_name {
            #[oai(status = 500)]
            InternalServerError(poem_openapi::payload::Json<$crate::routes::error::MyError>),

            $(
            #[oai(status = $status)]
            $name(poem_openapi::payload::Json<$crate::routes::error::MyError>),
            )*
        }

        impl $enum_name {
            paste::paste!{
                $(
                pub fn [<$name:snake>]<Err: std::fmt::Display>(
                    err: Err,
                ) -> Self {
                    $enum_name::$name(poem_openapi::payload::Json($crate::routes::error::MyError::new_error(err)))
                }
                )*
            }

            pub fn internal_error<Err: std::fmt::Display>(err: Err) -> Self {
                let error_msg = format!("{}", err);
                tracing::error!(error = error_msg, "internal server error");
                $enum_name::InternalServerError(poem_openapi::payload::Json(
                    $crate::routes::error::MyError::new_error("internal server error"),
                ))
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                match self {
                    $enum_name::InternalServerError(_) => {
                        write!(f, "internal server error")
                    }
                    $(
                    $enum_name::$name(e) => write!(f, "{}", e.0.message()),
                    )*
                }
            }
        }
    };
}

generate_error_response!(ApiError, (400, BadRequest), (404, NotFound));

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::UnknownSortField(_) => ApiError::bad_request(e),
            RepositoryError::Database(e) => ApiError::internal_error(e),
        }
    }
}
