use tonic::{
    metadata::{Ascii, MetadataValue},
    service::Interceptor,
};

use crate::{auth::AccessToken, error::Error};

/// Attaches `authorization: Bearer <token>` to every call made through the channel it wraps.
#[derive(Clone)]
pub struct BearerInterceptor {
    token: MetadataValue<Ascii>,
}

impl BearerInterceptor {
    pub fn new(token: &AccessToken) -> Result<Self, Error> {
        let bearer_token = format!("Bearer {}", token.as_str());
        let token = bearer_token
            .parse::<MetadataValue<Ascii>>()
            .map_err(Error::InvalidMetadata)?;
        Ok(BearerInterceptor { token })
    }
}

impl std::fmt::Debug for BearerInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("token_redacted")
    }
}

impl Interceptor for BearerInterceptor {
    fn call(&mut self, mut req: tonic::Request<()>) -> Result<tonic::Request<()>, tonic::Status> {
        req.metadata_mut().insert("authorization", self.token.clone());
        Ok(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(s: &str) -> AccessToken {
        AccessToken::from_bytes(s.as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn test_adds_bearer_authorization() {
        let mut interceptor = BearerInterceptor::new(&token("tok123")).unwrap();
        let req = interceptor.call(tonic::Request::new(())).unwrap();
        let value = req.metadata().get("authorization").unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer tok123");
    }

    #[test]
    fn test_applies_to_every_call() {
        let mut interceptor = BearerInterceptor::new(&token("tok123")).unwrap();
        for _ in 0..3 {
            let req = interceptor.call(tonic::Request::new(())).unwrap();
            assert_eq!(req.metadata().get_all("authorization").iter().count(), 1);
        }
    }

    #[test]
    fn test_replaces_existing_authorization() {
        let mut interceptor = BearerInterceptor::new(&token("fresh")).unwrap();
        let mut req = tonic::Request::new(());
        req.metadata_mut()
            .insert("authorization", "Bearer stale".parse().unwrap());
        let req = interceptor.call(req).unwrap();
        let value = req.metadata().get("authorization").unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer fresh");
    }

    #[test]
    fn test_rejects_token_with_control_characters() {
        let result = BearerInterceptor::new(&token("tok\n123"));
        assert!(matches!(result, Err(Error::InvalidMetadata(_))));
    }

    #[test]
    fn test_debug_redacts_token() {
        let interceptor = BearerInterceptor::new(&token("tok123")).unwrap();
        let debug = format!("{interceptor:?}");
        assert!(!debug.contains("tok123"));
    }
}
