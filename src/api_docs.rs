use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::root,
        api::health::ping,
        api::health::health_check,
        api::books::list_books,
        api::books::create_book,
        api::books::get_book,
        api::user::list_users,
        api::user::create_user,
        api::user::get_user,
        api::checkout::checkout_book,
        api::checkout::list_checkouts,
        api::checkout::return_book,
        api::reservation::reserve_book,
        api::reservation::list_reservations,
    ),
    components(
        schemas(
            api::books::CreateBookRequest,
            api::user::CreateUserRequest,
            api::checkout::CheckoutRequest,
            api::checkout::ReturnRequest,
            api::reservation::ReserveRequest,
            crate::models::book::Book,
            crate::models::copy::Model,
            crate::models::copy::CopyStatus,
            crate::models::user::Model,
            crate::models::user::Role,
            crate::models::checkout::Model,
            crate::models::reservation::Model,
        )
    ),
    tags(
        (name = "bibliolend", description = "Library circulation API")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_circulation_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/checkout", "/return", "/reserve", "/books", "/users"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
