//! Well-known keys in the key-value substrate.

use crate::id::UserId;

/// JSON array of users, in insertion order.
pub const USERS: &str = "lyric-locker-users";

/// JSON snapshot of the logged-in user; absent when logged out.
pub const CURRENT_USER: &str = "lyric-locker-current-user";

/// JSON array of lyrics, newest first.
pub const LYRICS: &str = "lyric-locker";

/// Set to `"true"` once the admin gate password has been supplied.
pub const ADMIN_GATE_VERIFIED: &str = "lyric-locker-admin-verified";

/// Set to `"true"` once the post gate password has been supplied.
pub const POST_GATE_VERIFIED: &str = "lyric-password-verified";

/// Key holding the credential hash for `user_id`. Kept outside the users
/// table so that listing users never reads secrets.
pub fn credential(user_id: &UserId) -> String {
  format!("user-password-{user_id}")
}
