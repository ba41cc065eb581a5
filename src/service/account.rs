use crate::config::Constants;
use crate::error::{WebError, WebResult};
use crate::model::account::MemberRow;
use crate::utils;
use sqlx::MySqlPool;

/// Account flows: login tokens, password reset, nickname change
///
/// Reset and nickname tokens live 5 minutes, one per member per purpose;
/// issuing a new one deletes its predecessor.
pub struct AccountService {
    pool: MySqlPool,
}

/// Offline password rules: at least 9 characters, at least 3 of the 4
/// character classes, no run of 3 or more identical characters
fn meets_complexity_rules(password: &str) -> bool {
    let length = password.chars().count();
    if length < 9 || length > 128 {
        return false;
    }

    let mut has_upper = false;
    let mut has_lower = false;
    let mut has_digit = false;
    let mut has_special = false;

    for c in password.chars() {
        if c.is_ascii_uppercase() {
            has_upper = true;
        } else if c.is_ascii_lowercase() {
            has_lower = true;
        } else if c.is_ascii_digit() {
            has_digit = true;
        } else {
            has_special = true;
        }
    }

    let classes = [has_upper, has_lower, has_digit, has_special]
        .iter()
        .filter(|&&used| used)
        .count();
    if classes < 3 {
        return false;
    }

    let chars: Vec<char> = password.chars().collect();
    !chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
}

/// A password may not contain the account's email local part or nickname
fn contains_personal_data(password: &str, email: Option<&str>, nickname: Option<&str>) -> bool {
    let lowered = password.to_lowercase();

    if let Some(local) = email.and_then(|e| e.split('@').next()) {
        if !local.is_empty() && lowered.contains(&local.to_lowercase()) {
            return true;
        }
    }

    if let Some(nickname) = nickname {
        if !nickname.is_empty() && lowered.contains(&nickname.to_lowercase()) {
            return true;
        }
    }

    false
}

/// Index into the nickname price table for the next change
fn price_index(change_count: i64) -> i64 {
    change_count.min(Constants::NICKNAME_PRICE_CAP)
}

impl AccountService {
    /// Create a new account service instance
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Issue a login token for valid credentials
    ///
    /// `None` on bad credentials. An active suspension (future expiry or
    /// permanent, null-expiry ban) refuses issuance without revealing
    /// anything beyond the refusal.
    pub async fn generate_login_token(
        &self,
        username: &str,
        password: &str,
    ) -> WebResult<Option<String>> {
        let member_id: Option<i32> =
            sqlx::query_scalar("SELECT id FROM member WHERE userid = ? AND passwd = ?")
                .bind(username)
                .bind(password)
                .fetch_optional(&self.pool)
                .await?;

        let Some(member_id) = member_id else {
            return Ok(None);
        };

        let active_bans: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM player_ban
             WHERE member_id = ? AND (expires_at IS NULL OR expires_at > NOW())",
        )
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;

        if active_bans > 0 {
            log::info!("login token refused for suspended member {member_id}");
            return Err(WebError::banned());
        }

        let token = utils::make_login_token();

        sqlx::query(
            "UPDATE member SET login_token_enabled = 1, login_token = ? WHERE userid = ?",
        )
        .bind(&token)
        .bind(username)
        .execute(&self.pool)
        .await?;

        Ok(Some(token))
    }

    /// Issue a 5-minute password-reset token for the account
    ///
    /// Prior tokens for the member are invalidated. Returns the token and
    /// the account email the boundary layer should deliver it to, or
    /// `None` for an unknown account.
    pub async fn get_password_reset_token(
        &self,
        username: &str,
    ) -> WebResult<Option<(String, Option<String>)>> {
        let account = sqlx::query_as::<_, MemberRow>(
            "SELECT id, userid, email, reset_blocked FROM member WHERE userid = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let Some(account) = account else {
            return Ok(None);
        };
        let member_id = account.id;

        let token = utils::make_auth_token();

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM password_reset_token WHERE member_id = ?")
            .bind(member_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO password_reset_token (member_id, token, expires_at)
             VALUES (?, ?, DATE_ADD(NOW(), INTERVAL ? MINUTE))",
        )
        .bind(member_id)
        .bind(&token)
        .bind(Constants::TOKEN_EXPIRE_MINUTES)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some((token, account.email)))
    }

    /// Commit a password reset authorized by a live token
    ///
    /// `false` for a stale or unknown token, a reset-blocked account, or a
    /// password failing the strength checks. Success deletes the token.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> WebResult<bool> {
        let member_id: Option<i32> = sqlx::query_scalar(
            "SELECT member_id FROM password_reset_token
             WHERE token = ? AND expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(member_id) = member_id else {
            return Ok(false);
        };

        let reset_blocked: bool =
            sqlx::query_scalar("SELECT reset_blocked FROM member WHERE id = ?")
                .bind(member_id)
                .fetch_one(&self.pool)
                .await?;

        if reset_blocked {
            log::info!("password reset refused for reset-blocked member {member_id}");
            return Ok(false);
        }

        if !self.check_password_strength(token, new_password).await? {
            return Ok(false);
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE member SET passwd = ? WHERE id = ?")
            .bind(new_password)
            .bind(member_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM password_reset_token WHERE member_id = ?")
            .bind(member_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(true)
    }

    /// Full password strength validation for a pending reset
    ///
    /// The offline rules come first; then the password is checked against
    /// the account's email local part and nickname, and finally against
    /// the known-bad-password table.
    pub async fn check_password_strength(&self, token: &str, password: &str) -> WebResult<bool> {
        if !meets_complexity_rules(password) {
            return Ok(false);
        }

        let account = sqlx::query_as::<_, (String, Option<String>)>(
            "SELECT m.userid, m.email
             FROM member m
             INNER JOIN password_reset_token t ON m.id = t.member_id
             WHERE t.token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some((userid, email)) = account else {
            return Ok(false);
        };

        let nickname: Option<String> =
            sqlx::query_scalar("SELECT nickname FROM char_info WHERE user_id = ?")
                .bind(&userid)
                .fetch_optional(&self.pool)
                .await?;

        if contains_personal_data(password, email.as_deref(), nickname.as_deref()) {
            return Ok(false);
        }

        let known_bad: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM bad_password WHERE password = ?")
                .bind(password)
                .fetch_one(&self.pool)
                .await?;

        Ok(known_bad == 0)
    }

    async fn resolve_member_and_player(
        &self,
        username: &str,
        password: &str,
    ) -> WebResult<Option<(i32, i32)>> {
        let pair = sqlx::query_as::<_, (i32, i32)>(
            "SELECT m.id, c.player_id
             FROM member m
             INNER JOIN char_info c ON m.userid = c.user_id
             WHERE m.userid = ? AND m.passwd = ?",
        )
        .bind(username)
        .bind(password)
        .fetch_optional(&self.pool)
        .await?;

        Ok(pair)
    }

    /// Price of the player's next nickname change, `None` past the table
    async fn next_change_price(&self, player_id: i32) -> WebResult<Option<i64>> {
        let change_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM nickname_history WHERE player_id = ?")
                .bind(player_id)
                .fetch_one(&self.pool)
                .await?;

        let price: Option<i64> =
            sqlx::query_scalar("SELECT price FROM nickname_price WHERE change_count = ?")
                .bind(price_index(change_count))
                .fetch_optional(&self.pool)
                .await?;

        Ok(price)
    }

    /// Whether the account can afford its next nickname change
    pub async fn get_nickname_changeable(
        &self,
        username: &str,
        password: &str,
    ) -> WebResult<bool> {
        let Some((_, player_id)) = self.resolve_member_and_player(username, password).await? else {
            return Ok(false);
        };

        let gem: Option<i64> =
            sqlx::query_scalar("SELECT gem FROM char_cash WHERE player_id = ?")
                .bind(player_id)
                .fetch_optional(&self.pool)
                .await?;

        let price = self.next_change_price(player_id).await?;

        Ok(matches!((gem, price), (Some(gem), Some(price)) if gem >= price))
    }

    /// Issue a 5-minute nickname-change token
    ///
    /// Requires valid credentials and a gem balance covering the next
    /// change's price; prior tokens for the member are invalidated.
    pub async fn get_change_nickname_token(
        &self,
        username: &str,
        password: &str,
    ) -> WebResult<Option<String>> {
        let Some((member_id, player_id)) =
            self.resolve_member_and_player(username, password).await?
        else {
            return Ok(None);
        };

        if !self.get_nickname_changeable(username, password).await? {
            return Ok(None);
        }

        let token = utils::make_auth_token();

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM nickname_change_token WHERE member_id = ?")
            .bind(member_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO nickname_change_token (member_id, player_id, token, expires_at)
             VALUES (?, ?, ?, DATE_ADD(NOW(), INTERVAL ? MINUTE))",
        )
        .bind(member_id)
        .bind(player_id)
        .bind(&token)
        .bind(Constants::TOKEN_EXPIRE_MINUTES)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(token))
    }

    /// Commit a nickname change authorized by a live token
    ///
    /// A nickname ever held by anyone, even one its holder renamed away
    /// from, can never be assigned again. The gem debit, the rename, the
    /// history append and the token delete are one transaction; any
    /// failure rolls all of them back.
    pub async fn change_nickname(&self, token: &str, nickname: &str) -> WebResult<bool> {
        let player_id: Option<i32> = sqlx::query_scalar(
            "SELECT player_id FROM nickname_change_token
             WHERE token = ? AND expires_at > NOW()",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(player_id) = player_id else {
            return Ok(false);
        };

        let historic_uses: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM nickname_history WHERE nickname = ?")
                .bind(nickname)
                .fetch_one(&self.pool)
                .await?;

        if historic_uses > 0 {
            return Ok(false);
        }

        let current_uses: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM char_info WHERE nickname = ?")
                .bind(nickname)
                .fetch_one(&self.pool)
                .await?;

        if current_uses > 0 {
            return Ok(false);
        }

        let current_nickname: Option<String> =
            sqlx::query_scalar("SELECT nickname FROM char_info WHERE player_id = ?")
                .bind(player_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(current_nickname) = current_nickname else {
            return Ok(false);
        };

        let Some(price) = self.next_change_price(player_id).await? else {
            return Ok(false);
        };

        let gem: Option<i64> =
            sqlx::query_scalar("SELECT gem FROM char_cash WHERE player_id = ?")
                .bind(player_id)
                .fetch_optional(&self.pool)
                .await?;

        match gem {
            Some(gem) if gem >= price => {}
            _ => return Ok(false),
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE char_cash SET gem = gem - ? WHERE player_id = ?")
            .bind(price)
            .bind(player_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE char_info SET nickname = ? WHERE player_id = ?")
            .bind(nickname)
            .bind(player_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO nickname_history (player_id, nickname, occur_date)
             VALUES (?, ?, NOW())",
        )
        .bind(player_id)
        .bind(&current_nickname)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM nickname_change_token WHERE player_id = ?")
            .bind(player_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        log::info!("player {player_id} renamed from {current_nickname} to {nickname}");

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_short_passwords() {
        assert!(!meets_complexity_rules("Ab1!xyz"));
        assert!(!meets_complexity_rules(""));
        assert!(meets_complexity_rules("Ab1!xyzw9"));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 7 characters, 12 bytes
        assert!(!meets_complexity_rules("ÄÖÜäö1!"));
        // 9 characters with a multibyte one still passes
        assert!(meets_complexity_rules("Äbcdefg12"));
    }

    #[test]
    fn test_requires_three_character_classes() {
        // lower only
        assert!(!meets_complexity_rules("abcdefghij"));
        // lower + digit
        assert!(!meets_complexity_rules("abcdefgh12"));
        // lower + digit + upper
        assert!(meets_complexity_rules("Abcdefgh12"));
        // lower + digit + special
        assert!(meets_complexity_rules("abcdefg12!"));
    }

    #[test]
    fn test_rejects_character_runs() {
        assert!(!meets_complexity_rules("Abcdddefg12"));
        assert!(!meets_complexity_rules("AAAbcdefg12"));
        // two in a row is fine
        assert!(meets_complexity_rules("Abcddefg12"));
    }

    #[test]
    fn test_personal_data_check() {
        assert!(contains_personal_data(
            "xXjohnny55!",
            Some("johnny@example.com"),
            None
        ));
        assert!(contains_personal_data(
            "SharpNote9x!",
            None,
            Some("sharpnote9")
        ));
        assert!(!contains_personal_data(
            "Unrelated55!",
            Some("johnny@example.com"),
            Some("sharpnote9")
        ));
        // empty local part or nickname never matches
        assert!(!contains_personal_data("Whatever55!", Some("@host"), Some("")));
    }

    #[test]
    fn test_price_index_caps_at_table_end() {
        assert_eq!(price_index(0), 0);
        assert_eq!(price_index(4), 4);
        assert_eq!(price_index(9), 9);
        assert_eq!(price_index(25), 9);
    }
}
