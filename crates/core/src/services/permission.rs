//! Role permission matrix.
//!
//! The matrix is total: every role maps to a fully populated capability
//! record, and the lookup is a pure `const fn` that cannot fail.

use yomu_db::entities::user::Role;

/// The fixed set of capabilities a role grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_read: bool,
    pub can_comment: bool,
    pub can_favorite: bool,
    pub can_upload: bool,
    /// Hide/restore comments and resolve comment reports.
    pub can_moderate_comments: bool,
    /// User management: roles, site bans, user reports, content review.
    pub can_administer: bool,
}

impl Capabilities {
    /// Look up the capability set for a role.
    #[must_use]
    pub const fn of(role: Role) -> Self {
        match role {
            Role::Member => Self {
                can_read: true,
                can_comment: true,
                can_favorite: true,
                can_upload: false,
                can_moderate_comments: false,
                can_administer: false,
            },
            Role::ApprenticeContributor => Self {
                can_read: true,
                can_comment: true,
                can_favorite: true,
                can_upload: true, // Requires approval
                can_moderate_comments: false,
                can_administer: false,
            },
            Role::SeniorContributor => Self {
                can_read: true,
                can_comment: true,
                can_favorite: true,
                can_upload: true, // Requires approval
                can_moderate_comments: true,
                can_administer: false,
            },
            Role::GroupLeader => Self {
                can_read: true,
                can_comment: true,
                can_favorite: true,
                can_upload: true, // No approval needed
                can_moderate_comments: true,
                can_administer: false,
            },
            Role::Moderator => Self {
                can_read: true,
                can_comment: true,
                can_favorite: true,
                can_upload: true,
                can_moderate_comments: true,
                can_administer: true,
            },
            Role::Owner => Self {
                can_read: true,
                can_comment: true,
                can_favorite: true,
                can_upload: true,
                can_moderate_comments: true,
                can_administer: true,
            },
        }
    }
}

/// Whether uploads by this role go through the review queue.
///
/// The two lowest upload-capable ranks submit for review; group leaders and
/// above publish directly.
#[must_use]
pub const fn upload_requires_approval(role: Role) -> bool {
    Capabilities::of(role).can_upload && (role as u8) < (Role::GroupLeader as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_matrix_is_total_and_pure() {
        for role in Role::iter() {
            // Pure lookup: repeated calls agree.
            assert_eq!(Capabilities::of(role), Capabilities::of(role));
            // Everyone can read.
            assert!(Capabilities::of(role).can_read);
        }
    }

    #[test]
    fn test_matrix_is_monotonic() {
        // Higher rank never loses a capability held by a lower rank.
        let ranks: Vec<Role> = Role::iter().collect();
        for pair in ranks.windows(2) {
            let (lower, higher) = (Capabilities::of(pair[0]), Capabilities::of(pair[1]));
            assert!(!lower.can_upload || higher.can_upload);
            assert!(!lower.can_moderate_comments || higher.can_moderate_comments);
            assert!(!lower.can_administer || higher.can_administer);
        }
    }

    #[test]
    fn test_upload_approval_routing() {
        assert!(!upload_requires_approval(Role::Member)); // cannot upload at all
        assert!(upload_requires_approval(Role::ApprenticeContributor));
        assert!(upload_requires_approval(Role::SeniorContributor));
        assert!(!upload_requires_approval(Role::GroupLeader));
        assert!(!upload_requires_approval(Role::Moderator));
        assert!(!upload_requires_approval(Role::Owner));
    }

    #[test]
    fn test_administer_ranks() {
        assert!(!Capabilities::of(Role::GroupLeader).can_administer);
        assert!(Capabilities::of(Role::Moderator).can_administer);
        assert!(Capabilities::of(Role::Owner).can_administer);
    }

    #[test]
    fn test_comment_moderation_starts_at_senior() {
        assert!(!Capabilities::of(Role::ApprenticeContributor).can_moderate_comments);
        assert!(Capabilities::of(Role::SeniorContributor).can_moderate_comments);
    }
}
