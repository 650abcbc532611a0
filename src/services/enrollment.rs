use std::collections::BTreeSet;

use crate::models::{Enrollment, IdIndex, SessionId, UserId, UserItemMatrix};

/// Pivots enrollment pairs into a binary user × session matrix.
///
/// Rows cover `known_users` followed by any user seen only in
/// `enrollments` (ascending); columns do the same for sessions. Repeated
/// pairs still yield 1.
pub fn build_user_item_matrix(
    enrollments: &[Enrollment],
    known_users: &[UserId],
    known_sessions: &[SessionId],
) -> UserItemMatrix {
    let mut users: IdIndex = known_users.iter().copied().collect();
    let mut sessions: IdIndex = known_sessions.iter().copied().collect();

    let extra_users: BTreeSet<UserId> = enrollments
        .iter()
        .map(|e| e.user_id)
        .filter(|id| !users.contains(*id))
        .collect();
    let extra_sessions: BTreeSet<SessionId> = enrollments
        .iter()
        .map(|e| e.session_id)
        .filter(|id| !sessions.contains(*id))
        .collect();
    for id in extra_users {
        users.insert(id);
    }
    for id in extra_sessions {
        sessions.insert(id);
    }

    let mut matrix = UserItemMatrix::zeros(users, sessions);
    for enrollment in enrollments {
        let user = matrix.users().position(enrollment.user_id);
        let session = matrix.sessions().position(enrollment.session_id);
        if let (Some(user), Some(session)) = (user, session) {
            matrix.mark(user, session);
        }
    }
    matrix
}
