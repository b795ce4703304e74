use actix_web::{dev::Payload, error::ErrorUnauthorized, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use strum_macros::EnumString;

/// Authentication mechanics live in the gateway in front of this service;
/// it forwards the verified staff id and role as headers. This extractor
/// only re-reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum StaffRole {
    Staff,
    /// The village head; may read everyone's history.
    Admin,
}

#[derive(Debug, Clone, Copy)]
pub struct StaffIdentity {
    pub staff_id: u64,
    pub role: StaffRole,
}

impl FromRequest for StaffIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let staff_id = match req
            .headers()
            .get("x-staff-id")
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
        {
            Some(id) => id,
            None => return ready(Err(ErrorUnauthorized("Missing staff identity"))),
        };

        let role = match req.headers().get("x-staff-role") {
            Some(h) => match h.to_str().ok().and_then(|v| v.parse::<StaffRole>().ok()) {
                Some(r) => r,
                None => return ready(Err(ErrorUnauthorized("Invalid staff role"))),
            },
            None => StaffRole::Staff,
        };

        ready(Ok(StaffIdentity { staff_id, role }))
    }
}

impl StaffIdentity {
    pub fn is_admin(&self) -> bool {
        self.role == StaffRole::Admin
    }

    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Admin only"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    async fn extract(req: TestRequest) -> Result<StaffIdentity, actix_web::Error> {
        let (req, mut payload) = req.to_http_parts();
        StaffIdentity::from_request(&req, &mut payload).await
    }

    #[actix_web::test]
    async fn reads_id_and_role_headers() {
        let identity = extract(
            TestRequest::default()
                .insert_header(("x-staff-id", "42"))
                .insert_header(("x-staff-role", "admin")),
        )
        .await
        .unwrap();

        assert_eq!(identity.staff_id, 42);
        assert!(identity.is_admin());
    }

    #[actix_web::test]
    async fn role_defaults_to_staff() {
        let identity = extract(TestRequest::default().insert_header(("x-staff-id", "42")))
            .await
            .unwrap();

        assert_eq!(identity.role, StaffRole::Staff);
        assert!(identity.require_admin().is_err());
    }

    #[actix_web::test]
    async fn missing_or_malformed_id_is_unauthorized() {
        assert!(extract(TestRequest::default()).await.is_err());
        assert!(
            extract(TestRequest::default().insert_header(("x-staff-id", "abc")))
                .await
                .is_err()
        );
    }
}
