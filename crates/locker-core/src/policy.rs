//! Authorization rules.
//!
//! The stores never look each other up. Whoever calls [`LyricStore`] states
//! the acting identity as an [`Actor`], and these predicates decide.
//!
//! [`LyricStore`]: crate::LyricStore

use crate::{id::UserId, lyric::Lyric, user::User};

/// The identity claims of whoever is performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
  pub id:       UserId,
  pub is_admin: bool,
}

impl Actor {
  pub fn new(id: impl Into<UserId>, is_admin: bool) -> Self {
    Self { id: id.into(), is_admin }
  }

  /// A caller with no session.
  pub fn anonymous() -> Self { Self { id: UserId::anonymous(), is_admin: false } }
}

impl From<&User> for Actor {
  fn from(user: &User) -> Self { Self { id: user.id.clone(), is_admin: user.is_admin } }
}

/// Ownership predicate: admins may delete anything, everyone else only what
/// carries their own id.
pub fn can_delete(lyric: &Lyric, actor: &Actor) -> bool {
  actor.is_admin || actor.id == lyric.user_id
}

/// The admin panel opens for an admin user, or for anyone who has supplied
/// the admin gate password. The two checks are independent.
pub fn can_access_admin_panel(user: Option<&User>, gate_unlocked: bool) -> bool {
  gate_unlocked || user.is_some_and(|u| u.is_admin)
}
