//! O2Jam community web backend
//!
//! Main application entry point that sets up the Rocket web server
//! with the gameplay and trade database connections, services and routes.

use rocket::fairing::AdHoc;
use rocket::{launch, Build, Rocket};

use O2Jam_web_rs::error::{bad_request, forbidden, internal_error, not_found, unauthorized};
use O2Jam_web_rs::route::CORS;
use O2Jam_web_rs::service::{
    AccountService, ExchangeService, InfoService, ScoreboardService, SearchService,
};
use O2Jam_web_rs::config::CONFIG;
use O2Jam_web_rs::{Database, DbPool};

use rocket_prometheus::PrometheusMetrics;

/// The two database handles the services draw from
///
/// `game` holds all gameplay and account tables; `trade` only mirrors
/// premium cash balances for the item shop.
#[derive(Clone)]
struct Pools {
    game: DbPool,
    trade: DbPool,
}

/// Initialize application services with database connections
fn init_services(
    pools: &Pools,
) -> (
    ScoreboardService,
    InfoService,
    AccountService,
    ExchangeService,
    SearchService,
) {
    let scoreboard_service = ScoreboardService::new(pools.game.clone());
    let info_service = InfoService::new(pools.game.clone());
    let account_service = AccountService::new(pools.game.clone());
    let exchange_service = ExchangeService::new(pools.game.clone(), pools.trade.clone());
    let search_service = SearchService::new(pools.game.clone());

    (
        scoreboard_service,
        info_service,
        account_service,
        exchange_service,
        search_service,
    )
}

/// Configure the Rocket application
async fn configure_rocket() -> Rocket<Build> {
    let prometheus = PrometheusMetrics::new();

    let figment = rocket::Config::figment()
        .merge(("address", CONFIG.host.clone()))
        .merge(("port", CONFIG.port));

    rocket::custom(figment)
        .attach(CORS)
        .attach(AdHoc::on_ignite("Databases", |rocket| async {
            let game = match Database::connect_game().await {
                Ok(pool) => {
                    log::info!("Gameplay database connection established");
                    pool
                }
                Err(e) => {
                    log::error!("Failed to connect to gameplay database: {e}");
                    std::process::exit(1);
                }
            };

            let trade = match Database::connect_trade().await {
                Ok(pool) => {
                    log::info!("Trade database connection established");
                    pool
                }
                Err(e) => {
                    log::error!("Failed to connect to trade database: {e}");
                    std::process::exit(1);
                }
            };

            rocket.manage(Pools { game, trade })
        }))
        .attach(AdHoc::on_ignite("Services", |rocket| async {
            let pools = rocket.state::<Pools>().unwrap().clone();
            let (
                scoreboard_service,
                info_service,
                account_service,
                exchange_service,
                search_service,
            ) = init_services(&pools);

            log::info!("Services initialized");
            rocket
                .manage(scoreboard_service)
                .manage(info_service)
                .manage(account_service)
                .manage(exchange_service)
                .manage(search_service)
        }))
        // for prometheus telemetry
        .attach(prometheus.clone())
        .mount("/metrics", prometheus)
        .mount("/api", O2Jam_web_rs::route::scoreboard::routes())
        .mount("/api", O2Jam_web_rs::route::info::routes())
        .mount("/api", O2Jam_web_rs::route::account::routes())
        .mount("/api", O2Jam_web_rs::route::search::routes())
        .mount("/", O2Jam_web_rs::route::exchange::routes())
        .register(
            "/",
            rocket::catchers![
                not_found,
                internal_error,
                bad_request,
                unauthorized,
                forbidden,
            ],
        )
}

/// Application entry point
#[launch]
async fn rocket() -> _ {
    // init log
    tracing_subscriber::fmt::init();

    log::info!("O2Jam web backend");
    log::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    log::info!("Starting server...");

    // Load environment variables
    dotenv::dotenv().ok();

    // Configure and launch the application
    configure_rocket().await
}
