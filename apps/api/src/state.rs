use std::sync::Arc;

use ipnet::IpNet;
use panelist_application::{
    AccessService, AuditEventHandler, AuditLogRepository, AuditService, AuthService, EventBus,
    PasswordVerifier, PracticeSessionRepository, PracticeSessionService, UserAdminService,
    UserRepository,
};

/// Port implementations the services are wired from.
pub struct AppAdapters {
    pub user_repository: Arc<dyn UserRepository>,
    pub audit_log_repository: Arc<dyn AuditLogRepository>,
    pub practice_session_repository: Arc<dyn PracticeSessionRepository>,
    pub password_verifier: Arc<dyn PasswordVerifier>,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_service: AccessService,
    pub audit_service: AuditService,
    pub auth_service: AuthService,
    pub user_admin_service: UserAdminService,
    pub practice_session_service: PracticeSessionService,
    pub trusted_proxies: Arc<[IpNet]>,
    pub frontend_url: String,
}

impl AppState {
    /// Wires services and the audit subscriber around the given adapters.
    pub fn build(
        adapters: AppAdapters,
        trusted_proxies: Vec<IpNet>,
        frontend_url: String,
    ) -> Self {
        let audit_service = AuditService::new(adapters.audit_log_repository);
        let event_bus = EventBus::builder()
            .subscribe(Arc::new(AuditEventHandler::new(audit_service.clone())))
            .build();
        let access_service = AccessService::new(adapters.user_repository.clone());

        Self {
            auth_service: AuthService::new(
                adapters.user_repository.clone(),
                adapters.password_verifier,
                event_bus.clone(),
            ),
            user_admin_service: UserAdminService::new(
                adapters.user_repository.clone(),
                event_bus.clone(),
            ),
            practice_session_service: PracticeSessionService::new(
                access_service.clone(),
                adapters.user_repository,
                adapters.practice_session_repository,
                event_bus,
            ),
            access_service,
            audit_service,
            trusted_proxies: trusted_proxies.into(),
            frontend_url,
        }
    }
}
