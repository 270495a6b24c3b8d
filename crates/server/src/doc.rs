use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "token",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some(
                        "Opaque token from /api/auth/login, sent as `Bearer <key>` or `Token <key>`",
                    ))
                    .build(),
            ),
        );
    }
}

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and the caller's account"),
        (name = "Professors", description = "Professor profiles"),
        (name = "Students", description = "Student profiles"),
        (name = "Class sections", description = "Class sections, rosters and representatives"),
        (name = "Enrollments", description = "Students enrolled in class sections"),
        (name = "Attendance", description = "Attendance records and percentages"),
        (name = "Public", description = "Listings available without authentication"),
        (name = "Health", description = "Service health"),
    ),
    info(
        title = "Attendance API",
        version = "1.0.0",
        description = "Class attendance and enrollment API",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;
