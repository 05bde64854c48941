mod generate;
mod inspect;

pub use generate::handle_generate;
pub use inspect::{handle_inspect, handle_verify};

use rtctoken::UserId;

/// `--account` wins over `--uid`; neither means an auto-assigned uid
pub(crate) fn user_id_from(uid: Option<u32>, account: Option<String>) -> UserId {
    match (uid, account) {
        (_, Some(account)) => UserId::account(account),
        (Some(uid), None) => UserId::from(uid),
        (None, None) => UserId::auto(),
    }
}
