//! Database initialization binary
//!
//! Creates the gameplay and trade schemas and seeds the lookup tables
//! (tiers, progress labels, nickname prices, known-bad passwords).

use std::process;
use O2Jam_web_rs::{Database, DbPool};

const GAME_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS member (
        id INT NOT NULL AUTO_INCREMENT,
        userid VARCHAR(32) NOT NULL,
        passwd VARCHAR(128) NOT NULL,
        email VARCHAR(128) DEFAULT NULL,
        reset_blocked TINYINT(1) NOT NULL DEFAULT 0,
        login_token_enabled TINYINT(1) NOT NULL DEFAULT 0,
        login_token VARCHAR(64) DEFAULT NULL,
        PRIMARY KEY (id),
        UNIQUE KEY uk_member_userid (userid)
    )",
    "CREATE TABLE IF NOT EXISTS char_info (
        player_id INT NOT NULL,
        user_id VARCHAR(32) NOT NULL,
        nickname VARCHAR(32) NOT NULL,
        level INT NOT NULL DEFAULT 1,
        play_count INT NOT NULL DEFAULT 0,
        admin_level INT NOT NULL DEFAULT 0,
        last_access DATETIME DEFAULT NULL,
        PRIMARY KEY (player_id),
        UNIQUE KEY uk_char_info_user (user_id),
        UNIQUE KEY uk_char_info_nickname (nickname)
    )",
    "CREATE TABLE IF NOT EXISTS char_cash (
        player_id INT NOT NULL,
        gem BIGINT NOT NULL DEFAULT 0,
        mcash BIGINT NOT NULL DEFAULT 0,
        PRIMARY KEY (player_id)
    )",
    "CREATE TABLE IF NOT EXISTS chart_meta (
        chart_id INT NOT NULL,
        title VARCHAR(128) NOT NULL,
        artist VARCHAR(128) DEFAULT NULL,
        charter VARCHAR(64) DEFAULT NULL,
        bpm DOUBLE DEFAULT NULL,
        PRIMARY KEY (chart_id)
    )",
    "CREATE TABLE IF NOT EXISTS chart_data (
        chart_id INT NOT NULL,
        difficulty INT NOT NULL,
        note_level INT NOT NULL,
        note_count INT NOT NULL DEFAULT 0,
        play_count INT NOT NULL DEFAULT 0,
        PRIMARY KEY (chart_id, difficulty)
    )",
    "CREATE TABLE IF NOT EXISTS highscore (
        player_id INT NOT NULL,
        chart_id INT NOT NULL,
        difficulty INT NOT NULL,
        score INT NOT NULL DEFAULT 0,
        cool INT NOT NULL DEFAULT 0,
        good INT NOT NULL DEFAULT 0,
        bad INT NOT NULL DEFAULT 0,
        miss INT NOT NULL DEFAULT 0,
        max_combo INT NOT NULL DEFAULT 0,
        progress INT NOT NULL DEFAULT 0,
        is_clear TINYINT(1) NOT NULL DEFAULT 0,
        played_time DATETIME DEFAULT NULL,
        pattern_order INT NOT NULL DEFAULT 0,
        play_speed_rate DOUBLE DEFAULT NULL,
        play_timing_rate DOUBLE DEFAULT NULL,
        fln_option INT NOT NULL DEFAULT 0,
        sln_option INT NOT NULL DEFAULT 0,
        is_nln TINYINT(1) NOT NULL DEFAULT 0,
        PRIMARY KEY (player_id, chart_id, difficulty),
        KEY idx_highscore_chart (chart_id, difficulty, score)
    )",
    "CREATE TABLE IF NOT EXISTS play_log (
        log_id BIGINT NOT NULL AUTO_INCREMENT,
        player_id INT NOT NULL,
        chart_id INT NOT NULL,
        difficulty INT NOT NULL,
        score INT NOT NULL DEFAULT 0,
        cool INT NOT NULL DEFAULT 0,
        good INT NOT NULL DEFAULT 0,
        bad INT NOT NULL DEFAULT 0,
        miss INT NOT NULL DEFAULT 0,
        max_combo INT NOT NULL DEFAULT 0,
        progress INT NOT NULL DEFAULT 0,
        is_clear TINYINT(1) NOT NULL DEFAULT 0,
        played_time DATETIME NOT NULL,
        pattern_order INT NOT NULL DEFAULT 0,
        play_speed_rate DOUBLE DEFAULT NULL,
        play_timing_rate DOUBLE DEFAULT NULL,
        fln_option INT NOT NULL DEFAULT 0,
        sln_option INT NOT NULL DEFAULT 0,
        is_nln TINYINT(1) NOT NULL DEFAULT 0,
        PRIMARY KEY (log_id),
        KEY idx_play_log_player_time (player_id, played_time)
    )",
    "CREATE TABLE IF NOT EXISTS player_status (
        player_id INT NOT NULL,
        p_count INT NOT NULL DEFAULT 0,
        ss_count INT NOT NULL DEFAULT 0,
        s_count INT NOT NULL DEFAULT 0,
        a_count INT NOT NULL DEFAULT 0,
        b_count INT NOT NULL DEFAULT 0,
        c_count INT NOT NULL DEFAULT 0,
        d_count INT NOT NULL DEFAULT 0,
        clear_count INT NOT NULL DEFAULT 0,
        tier INT NOT NULL DEFAULT 0,
        updated_time DATETIME DEFAULT NULL,
        PRIMARY KEY (player_id)
    )",
    "CREATE TABLE IF NOT EXISTS tier_info (
        tier_index INT NOT NULL,
        tier_name VARCHAR(32) NOT NULL,
        PRIMARY KEY (tier_index)
    )",
    "CREATE TABLE IF NOT EXISTS progress_info (
        progress_index INT NOT NULL,
        progress_name VARCHAR(16) NOT NULL,
        PRIMARY KEY (progress_index)
    )",
    "CREATE TABLE IF NOT EXISTS nickname_history (
        history_id INT NOT NULL AUTO_INCREMENT,
        player_id INT NOT NULL,
        nickname VARCHAR(32) NOT NULL,
        occur_date DATETIME NOT NULL,
        PRIMARY KEY (history_id),
        KEY idx_nickname_history_player (player_id),
        KEY idx_nickname_history_nickname (nickname)
    )",
    "CREATE TABLE IF NOT EXISTS nickname_price (
        change_count INT NOT NULL,
        price BIGINT NOT NULL,
        PRIMARY KEY (change_count)
    )",
    "CREATE TABLE IF NOT EXISTS password_reset_token (
        member_id INT NOT NULL,
        token VARCHAR(64) NOT NULL,
        expires_at DATETIME NOT NULL,
        PRIMARY KEY (member_id),
        UNIQUE KEY uk_password_reset_token (token)
    )",
    "CREATE TABLE IF NOT EXISTS nickname_change_token (
        member_id INT NOT NULL,
        player_id INT NOT NULL,
        token VARCHAR(64) NOT NULL,
        expires_at DATETIME NOT NULL,
        PRIMARY KEY (member_id),
        UNIQUE KEY uk_nickname_change_token (token)
    )",
    "CREATE TABLE IF NOT EXISTS player_ban (
        ban_id INT NOT NULL AUTO_INCREMENT,
        member_id INT NOT NULL,
        reason VARCHAR(255) DEFAULT NULL,
        expires_at DATETIME DEFAULT NULL,
        PRIMARY KEY (ban_id),
        KEY idx_player_ban_member (member_id)
    )",
    "CREATE TABLE IF NOT EXISTS bad_password (
        password VARCHAR(128) NOT NULL,
        PRIMARY KEY (password)
    )",
    "CREATE TABLE IF NOT EXISTS player_badge (
        chart_id INT NOT NULL,
        badge_name VARCHAR(64) NOT NULL,
        badge_css_tag VARCHAR(64) NOT NULL,
        badge_priority INT NOT NULL DEFAULT 0,
        PRIMARY KEY (chart_id)
    )",
    "CREATE TABLE IF NOT EXISTS clear_history (
        player_id INT NOT NULL,
        date DATE NOT NULL,
        level INT NOT NULL DEFAULT 0,
        PRIMARY KEY (player_id, date)
    )",
    "CREATE TABLE IF NOT EXISTS login_session (
        player_id INT NOT NULL,
        sub_channel INT NOT NULL DEFAULT 0,
        logged_in_at DATETIME DEFAULT NULL,
        PRIMARY KEY (player_id)
    )",
    "CREATE TABLE IF NOT EXISTS chart_playcount_snapshot (
        chart_id INT NOT NULL,
        snapshot_date DATE NOT NULL,
        play_count INT NOT NULL DEFAULT 0,
        PRIMARY KEY (chart_id, snapshot_date)
    )",
];

const TRADE_TABLES: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS user_mcash (
        id INT NOT NULL,
        mcash BIGINT NOT NULL DEFAULT 0,
        PRIMARY KEY (id)
    )",
];

const SEEDS: &[&str] = &[
    "INSERT IGNORE INTO tier_info (tier_index, tier_name) VALUES
        (0, 'Unranked'),
        (1, 'Bronze'),
        (2, 'Silver'),
        (3, 'Gold'),
        (4, 'Platinum'),
        (5, 'Diamond'),
        (6, 'Master')",
    "INSERT IGNORE INTO progress_info (progress_index, progress_name) VALUES
        (0, 'F'),
        (1, 'D'),
        (2, 'C'),
        (3, 'B'),
        (4, 'A'),
        (5, 'S'),
        (6, 'SS'),
        (7, 'Clear'),
        (8, 'P')",
    "INSERT IGNORE INTO nickname_price (change_count, price) VALUES
        (0, 100000),
        (1, 200000),
        (2, 400000),
        (3, 800000),
        (4, 1600000),
        (5, 3200000),
        (6, 6400000),
        (7, 12800000),
        (8, 25600000),
        (9, 51200000)",
    "INSERT IGNORE INTO bad_password (password) VALUES
        ('password1'), ('qwerty123'), ('12345678a'), ('o2jam12345')",
];

async fn run_statements(pool: &DbPool, statements: &[&str]) -> Result<(), sqlx::Error> {
    for statement in statements {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    log::info!("O2Jam Web Database Initialization");
    log::info!("=================================");

    log::info!("Connecting to gameplay database...");
    let game_pool = match Database::connect_game().await {
        Ok(pool) => {
            log::info!("Gameplay database connection established");
            pool
        }
        Err(e) => {
            log::error!("Failed to connect to gameplay database: {e}");
            process::exit(1);
        }
    };

    log::info!("Connecting to trade database...");
    let trade_pool = match Database::connect_trade().await {
        Ok(pool) => {
            log::info!("Trade database connection established");
            pool
        }
        Err(e) => {
            log::error!("Failed to connect to trade database: {e}");
            process::exit(1);
        }
    };

    log::info!("Creating gameplay tables...");
    if let Err(e) = run_statements(&game_pool, GAME_TABLES).await {
        log::error!("Failed to create gameplay tables: {e}");
        process::exit(1);
    }

    log::info!("Creating trade tables...");
    if let Err(e) = run_statements(&trade_pool, TRADE_TABLES).await {
        log::error!("Failed to create trade tables: {e}");
        process::exit(1);
    }

    log::info!("Seeding lookup tables...");
    if let Err(e) = run_statements(&game_pool, SEEDS).await {
        log::error!("Failed to seed lookup tables: {e}");
        process::exit(1);
    }

    log::info!("Database initialization completed successfully!");
    log::info!("The following have been initialized:");
    log::info!("  - Account and character tables");
    log::info!("  - Chart metadata and score tables");
    log::info!("  - Tier, progress and nickname price lookups");
    log::info!("  - Trade database premium cash mirror");
    log::info!("");
    log::info!("You can now start the web backend!");
}
