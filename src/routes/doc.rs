use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    models::{Dog, Employee, Event},
    response::ApiResponse,
    routes::{dogs, employees, events, health},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        dogs::api_list,
        dogs::api_get,
        events::api_list_for_dog,
    ),
    components(
        schemas(
            Dog,
            Event,
            health::HealthData,
            health::HealthChecks,
            ApiResponse<Dog>,
            ApiResponse<Vec<Dog>>,
            ApiResponse<Vec<Event>>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Dogs", description = "Dog endpoints"),
        (name = "Events", description = "Dog event endpoints"),
    )
)]
pub struct DogApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        employees::api_list,
        employees::api_get,
    ),
    components(
        schemas(
            Employee,
            health::HealthData,
            health::HealthChecks,
            ApiResponse<Employee>,
            ApiResponse<Vec<Employee>>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Employees", description = "Employee endpoints"),
    )
)]
pub struct EmployeeApiDoc;

pub fn dog_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", DogApiDoc::openapi())
}

pub fn employee_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", EmployeeApiDoc::openapi())
}
