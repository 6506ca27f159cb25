use actix_web::web;

pub mod health;
pub mod tables;

/// Register every route. `main.rs` and the route tests share this.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.configure(health::configure_routes);

    // Table routes: /api/tables/**
    cfg.service(web::scope("/api/tables").configure(tables::configure_routes));
}
