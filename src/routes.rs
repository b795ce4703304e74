use crate::{
    api::{attendance, settings},
    config::Config,
};
use actix_governor::{
    governor::middleware::NoOpMiddleware, Governor, GovernorConfig, GovernorConfigBuilder,
    PeerIpKeyExtractor,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter config
    fn build_limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap()
    }

    let submit_conf = build_limiter(config.rate_submit_per_min);
    let read_conf = build_limiter(config.rate_read_per_min);

    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(
                        web::resource("")
                            .wrap(Governor::new(&submit_conf))
                            .route(web::post().to(attendance::submit)),
                    )
                    // /attendance/today
                    .service(
                        web::resource("/today")
                            .wrap(Governor::new(&read_conf))
                            .route(web::get().to(attendance::today)),
                    )
                    // /attendance/history
                    .service(
                        web::resource("/history")
                            .wrap(Governor::new(&read_conf))
                            .route(web::get().to(attendance::history)),
                    ),
            )
            .service(
                web::scope("/settings")
                    // /settings
                    .service(
                        web::resource("")
                            .wrap(Governor::new(&read_conf))
                            .route(web::get().to(settings::get_settings)),
                    ),
            ),
    );
}
