//! Local socket peer authentication.
//!
//! Service sockets only trust a peer whose kernel-supplied credentials
//! (`SCM_CREDENTIALS`) resolve to the configured service account. The check
//! must run before any payload from the connection is parsed.

use std::ffi::CString;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use byteorder::{ByteOrder, NativeEndian};

use crate::config::AuthConfig;
use crate::error::PacketError;
use crate::header::ensure_len;
use nix::unistd::{chown, getgrouplist, Gid, Uid, User};

const SOCKET_MODE: u32 = 0o660;

/// One control message received alongside socket data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AncillaryMessage {
    /// `cmsg_level`, e.g. `SOL_SOCKET`.
    pub level: i32,
    /// `cmsg_type`, e.g. `SCM_CREDENTIALS`.
    pub kind: i32,
    pub data: Vec<u8>,
}

impl AncillaryMessage {
    pub fn new(level: i32, kind: i32, data: Vec<u8>) -> Self {
        AncillaryMessage { level, kind, data }
    }

    fn is_credentials(&self) -> bool {
        self.level == libc::SOL_SOCKET && self.kind == libc::SCM_CREDENTIALS
    }
}

/// Sender identity as reported by the kernel (`struct ucred`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeerCredential {
    pub pid: i32,
    pub uid: u32,
    pub gid: u32,
}

impl PeerCredential {
    pub const LEN: usize = 12;

    /// Read a `struct ucred` in host byte order.
    pub fn from_bytes(data: &[u8]) -> Result<Self, PacketError> {
        ensure_len(data, Self::LEN)?;
        Ok(PeerCredential {
            pid: NativeEndian::read_i32(&data[0..4]),
            uid: NativeEndian::read_u32(&data[4..8]),
            gid: NativeEndian::read_u32(&data[8..12]),
        })
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut bytes = [0u8; Self::LEN];
        NativeEndian::write_i32(&mut bytes[0..4], self.pid);
        NativeEndian::write_u32(&mut bytes[4..8], self.uid);
        NativeEndian::write_u32(&mut bytes[8..12], self.gid);
        bytes
    }
}

/// Account database lookups.
pub trait UserDirectory {
    fn account_name(&self, uid: u32) -> Option<String>;

    /// `(uid, primary gid)` of an account.
    fn account_ids(&self, name: &str) -> Option<(u32, u32)>;

    /// Every group the account belongs to, `gid` included.
    fn groups(&self, name: &str, gid: u32) -> Vec<u32>;
}

/// The system passwd/group database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemUsers;

impl UserDirectory for SystemUsers {
    fn account_name(&self, uid: u32) -> Option<String> {
        match User::from_uid(Uid::from_raw(uid)) {
            Ok(user) => user.map(|u| u.name),
            Err(err) => {
                tracing::warn!(uid, "passwd lookup failed: {err}");
                None
            }
        }
    }

    fn account_ids(&self, name: &str) -> Option<(u32, u32)> {
        match User::from_name(name) {
            Ok(user) => user.map(|u| (u.uid.as_raw(), u.gid.as_raw())),
            Err(err) => {
                tracing::warn!(name, "passwd lookup failed: {err}");
                None
            }
        }
    }

    fn groups(&self, name: &str, gid: u32) -> Vec<u32> {
        let groups = CString::new(name)
            .ok()
            .and_then(|c_name| getgrouplist(&c_name, Gid::from_raw(gid)).ok());

        match groups {
            Some(groups) => groups.into_iter().map(Gid::as_raw).collect(),
            None => vec![gid],
        }
    }
}

/// Checks ancillary data against the configured service account.
#[derive(Debug, Clone)]
pub struct PeerAuthenticator<D = SystemUsers> {
    service_account: String,
    users: D,
}

impl PeerAuthenticator<SystemUsers> {
    pub fn new(config: &AuthConfig) -> Self {
        Self::with_directory(config, SystemUsers)
    }
}

impl<D: UserDirectory> PeerAuthenticator<D> {
    pub fn with_directory(config: &AuthConfig, users: D) -> Self {
        PeerAuthenticator {
            service_account: config.service_account.clone(),
            users,
        }
    }

    /// Pull the peer credentials out of a set of control messages.
    ///
    /// `None` when no credential message is present or it is too short.
    pub fn credential(&self, ancillary: &[AncillaryMessage]) -> Option<PeerCredential> {
        let message = ancillary.iter().rev().find(|m| m.is_credentials())?;
        match PeerCredential::from_bytes(&message.data) {
            Ok(credential) => Some(credential),
            Err(err) => {
                tracing::warn!("malformed peer credentials: {err}");
                None
            }
        }
    }

    /// `true` only when the peer's uid resolves to the service account.
    pub fn authenticate_peer(&self, ancillary: &[AncillaryMessage]) -> bool {
        let Some(credential) = self.credential(ancillary) else {
            tracing::debug!("peer sent no credentials");
            return false;
        };

        let account = self.users.account_name(credential.uid);
        let authenticated = account.as_deref() == Some(self.service_account.as_str());
        tracing::debug!(
            pid = credential.pid,
            uid = credential.uid,
            account = account.as_deref().unwrap_or("<unknown>"),
            authenticated,
            "peer authentication"
        );
        authenticated
    }

    /// Group memberships of the peer's account.
    pub fn peer_groups(&self, credential: &PeerCredential) -> Vec<u32> {
        match self.users.account_name(credential.uid) {
            Some(name) => self.users.groups(&name, credential.gid),
            None => vec![credential.gid],
        }
    }
}

/// [`PeerAuthenticator::authenticate_peer`] against the default service account.
pub fn authenticate_peer(ancillary: &[AncillaryMessage]) -> bool {
    PeerAuthenticator::new(&AuthConfig::default()).authenticate_peer(ancillary)
}

/// Hand a service socket to `account` and its primary group, mode `0660`.
///
/// Needs to run as root for sockets root created.
pub fn set_socket_owner(path: &Path, account: &str) -> io::Result<()> {
    let (uid, gid) = SystemUsers.account_ids(account).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("unknown account {account:?}"),
        )
    })?;

    chown(path, Some(Uid::from_raw(uid)), Some(Gid::from_raw(gid)))?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(SOCKET_MODE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeUsers {
        accounts: HashMap<u32, &'static str>,
    }

    impl FakeUsers {
        fn new() -> Self {
            FakeUsers {
                accounts: HashMap::from([(0, "root"), (1000, "dnx"), (1001, "mallory")]),
            }
        }
    }

    impl UserDirectory for FakeUsers {
        fn account_name(&self, uid: u32) -> Option<String> {
            self.accounts.get(&uid).map(|n| n.to_string())
        }

        fn account_ids(&self, name: &str) -> Option<(u32, u32)> {
            self.accounts
                .iter()
                .find(|(_, n)| **n == name)
                .map(|(uid, _)| (*uid, *uid))
        }

        fn groups(&self, _name: &str, gid: u32) -> Vec<u32> {
            vec![gid, 27]
        }
    }

    fn authenticator() -> PeerAuthenticator<FakeUsers> {
        PeerAuthenticator::with_directory(&AuthConfig::default(), FakeUsers::new())
    }

    fn credentials(uid: u32) -> AncillaryMessage {
        let credential = PeerCredential {
            pid: 4242,
            uid,
            gid: uid,
        };
        AncillaryMessage::new(
            libc::SOL_SOCKET,
            libc::SCM_CREDENTIALS,
            credential.to_bytes().to_vec(),
        )
    }

    #[test]
    fn missing_credentials_fail() {
        let rights = AncillaryMessage::new(libc::SOL_SOCKET, libc::SCM_RIGHTS, vec![0; 4]);
        assert!(!authenticator().authenticate_peer(&[]));
        assert!(!authenticator().authenticate_peer(&[rights]));
    }

    #[test]
    fn service_account_passes() {
        let rights = AncillaryMessage::new(libc::SOL_SOCKET, libc::SCM_RIGHTS, vec![0; 4]);
        assert!(authenticator().authenticate_peer(&[rights, credentials(1000)]));
    }

    #[test]
    fn other_accounts_fail() {
        assert!(!authenticator().authenticate_peer(&[credentials(1001)]));
        assert!(!authenticator().authenticate_peer(&[credentials(0)]));
        assert!(!authenticator().authenticate_peer(&[credentials(5555)]));
    }

    #[test]
    fn wrong_level_is_ignored() {
        let mut message = credentials(1000);
        message.level = libc::IPPROTO_IP;
        assert!(!authenticator().authenticate_peer(&[message]));
    }

    #[test]
    fn short_credentials_fail() {
        let mut message = credentials(1000);
        message.data.truncate(8);
        assert_eq!(authenticator().credential(&[message.clone()]), None);
        assert!(!authenticator().authenticate_peer(&[message]));
    }

    #[test]
    fn credential_fields() {
        let credential = authenticator().credential(&[credentials(1000)]).unwrap();
        assert_eq!(
            credential,
            PeerCredential {
                pid: 4242,
                uid: 1000,
                gid: 1000,
            }
        );
        assert_eq!(authenticator().peer_groups(&credential), vec![1000, 27]);
    }

    #[test]
    fn unknown_account_cannot_own_socket() {
        let err = set_socket_owner(Path::new("/nonexistent.sock"), "no-such-account-here")
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn system_directory_knows_root() {
        assert_eq!(SystemUsers.account_name(0).as_deref(), Some("root"));
        assert_eq!(SystemUsers.account_ids("root"), Some((0, 0)));
        assert!(SystemUsers.groups("root", 0).contains(&0));
    }
}
