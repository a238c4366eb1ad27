use crate::constants::HOME_MESSAGE;

#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses(
        (status = 200, description = "Service banner", body = String, content_type = "text/plain")
    )
)]
pub async fn home() -> &'static str {
    HOME_MESSAGE
}
