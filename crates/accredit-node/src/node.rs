//! The Accredit node.
//!
//! One task owns the [`Ledger`] and applies commands from the HTTP API one
//! at a time, so every transition is serialized without locks. A committed
//! transition is written to the store before its reply goes out: the
//! snapshot when state changed, then the new events to the event log.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

use accredit_ledger::{IssuerKind, Ledger, LedgerError};

use crate::commands::{
    AccessRootResponse, CompanyResponse, CredentialResponse, EventsResponse, GrantResponse,
    InstitutionStatusResponse, IssuedResponse, LedgerCommand, LedgerStatus, Reply, RoleResponse,
};
use crate::config::AccreditConfig;
use crate::state::NodeState;
use crate::storage::SnapshotStore;

/// Capacity of the API → ledger command channel.
const COMMAND_CHANNEL_CAPACITY: usize = 256;

/// The node: ledger, snapshot store and HTTP API.
pub struct AccreditNode {
    config: AccreditConfig,
    /// The ledger (moved into the command loop while `run` is active).
    ledger: Option<Ledger>,
    store: Option<SnapshotStore>,
    node_state: Option<Arc<NodeState>>,
    command_rx: Option<mpsc::Receiver<LedgerCommand>>,
}

impl AccreditNode {
    /// Create the node, restoring the ledger from the last snapshot if any.
    pub fn new(config: AccreditConfig) -> Result<Self> {
        config.ledger.validate()?;

        let store = if config.storage.persist {
            Some(SnapshotStore::open(&config.storage.data_dir)?)
        } else {
            None
        };

        let snapshot = match &store {
            Some(store) => store.load()?,
            None => None,
        };
        let events = match &store {
            Some(store) => store.load_events(config.ledger.event_retention)?,
            None => Vec::new(),
        };
        let ledger = match snapshot {
            Some(snapshot) => Ledger::from_snapshot(config.ledger.clone(), snapshot)?,
            None => Ledger::new(config.ledger.clone()),
        }
        .with_events(events);

        tracing::info!(
            persist = config.storage.persist,
            data_dir = %config.storage.data_dir.display(),
            credentials = ledger.credential_count(),
            "Accredit node created"
        );

        Ok(Self {
            config,
            ledger: Some(ledger),
            store,
            node_state: None,
            command_rx: None,
        })
    }

    /// Open the command channel and start the HTTP API.
    pub async fn start(&mut self) -> Result<()> {
        tracing::info!("starting Accredit node");

        let (command_tx, command_rx) = mpsc::channel::<LedgerCommand>(COMMAND_CHANNEL_CAPACITY);
        let node_state = Arc::new(NodeState::new(command_tx));

        let api_addr = self.config.api_addr()?;
        let api_state = node_state.clone();
        tokio::spawn(async move {
            if let Err(e) = crate::api::start_api_server(api_addr, api_state).await {
                tracing::error!(error = %e, "HTTP API server error");
            }
        });

        self.node_state = Some(node_state);
        self.command_rx = Some(command_rx);
        Ok(())
    }

    /// Apply API commands until the channel closes.
    pub async fn run(&mut self) -> Result<()> {
        let command_rx = self
            .command_rx
            .take()
            .ok_or_else(|| anyhow::anyhow!("node not started"))?;
        let ledger = self
            .ledger
            .take()
            .ok_or_else(|| anyhow::anyhow!("ledger already running"))?;

        tracing::info!("entering ledger command loop");
        let ledger = run_ledger(ledger, self.store.as_ref(), command_rx).await?;
        self.ledger = Some(ledger);
        Ok(())
    }

    /// Write a final snapshot and release resources.
    pub async fn shutdown(&mut self) -> Result<()> {
        tracing::info!("shutting down Accredit node");
        self.node_state = None;

        if let (Some(store), Some(ledger)) = (&self.store, &self.ledger) {
            store.save(&ledger.snapshot())?;
            tracing::info!(path = %store.path().display(), "final snapshot written");
        }

        tracing::info!("Accredit node shut down");
        Ok(())
    }

    pub fn ledger(&self) -> Option<&Ledger> {
        self.ledger.as_ref()
    }

    pub fn state(&self) -> Option<&Arc<NodeState>> {
        self.node_state.as_ref()
    }
}

/// Serve ledger commands until every sender is dropped, then hand the
/// ledger back.
///
/// With a store, no success is reported before it is on disk. If a write
/// fails the caller gets `Internal` and the loop stops: the in-memory ledger
/// is ahead of disk and must not serve further commands.
pub async fn run_ledger(
    mut ledger: Ledger,
    store: Option<&SnapshotStore>,
    mut command_rx: mpsc::Receiver<LedgerCommand>,
) -> Result<Ledger> {
    while let Some(cmd) = command_rx.recv().await {
        let changes_state = cmd.changes_state();
        let from_seq = ledger.next_event_seq();
        let reply = handle_command(&mut ledger, cmd);

        if let (Some(store), true) = (store, reply.is_ok()) {
            if let Err(e) = persist(store, &ledger, from_seq, changes_state) {
                tracing::error!(error = %e, "failed to persist committed transition, stopping");
                reply.fail(LedgerError::Internal("transition could not be persisted".into()));
                return Err(e.context("persisting ledger"));
            }
        }
        reply.send();
    }
    tracing::info!("ledger command channel closed");
    Ok(ledger)
}

/// Write the effects of one committed command. State goes first, so a crash
/// in between can lose an event but never log one for unsaved state.
fn persist(
    store: &SnapshotStore,
    ledger: &Ledger,
    from_seq: u64,
    changes_state: bool,
) -> Result<()> {
    if changes_state {
        store.save(&ledger.snapshot())?;
    }
    let events = ledger.events_since(from_seq);
    if !events.is_empty() {
        store.append_events(events)?;
    }
    Ok(())
}

/// A reply held back until the transition it reports is durable.
trait PendingReply: Send {
    fn is_ok(&self) -> bool;
    fn send(self: Box<Self>);
    fn fail(self: Box<Self>, err: LedgerError);
}

struct Pending<T> {
    reply: Reply<T>,
    result: Result<T, LedgerError>,
}

impl<T: Send> PendingReply for Pending<T> {
    fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    fn send(self: Box<Self>) {
        let Pending { reply, result } = *self;
        if reply.send(result).is_err() {
            tracing::debug!("API handler dropped the reply channel");
        }
    }

    fn fail(self: Box<Self>, err: LedgerError) {
        let Pending { reply, .. } = *self;
        if reply.send(Err(err)).is_err() {
            tracing::debug!("API handler dropped the reply channel");
        }
    }
}

fn pending<T: Send + 'static>(reply: Reply<T>, result: Result<T, LedgerError>) -> Box<dyn PendingReply> {
    Box::new(Pending { reply, result })
}

fn role_response(address: accredit_core::Address, role: &str) -> RoleResponse {
    RoleResponse {
        address,
        role: role.into(),
        status: "added".into(),
    }
}

fn company_response(ledger: &Ledger, company: accredit_core::Address) -> CompanyResponse {
    CompanyResponse {
        address: company,
        verified: ledger.company_status(&company),
        attestations: ledger
            .company(&company)
            .map_or(0, |record| record.attestation_count()),
        score: ledger.company_stats(&company),
    }
}

/// Apply one command to the ledger. The reply is returned, not sent.
fn handle_command(ledger: &mut Ledger, cmd: LedgerCommand) -> Box<dyn PendingReply> {
    match cmd {
        LedgerCommand::AddAdmin {
            caller,
            admin,
            reply,
        } => {
            let result = ledger
                .add_admin(&caller, admin)
                .map(|()| role_response(admin, "admin"));
            pending(reply, result)
        }
        LedgerCommand::AddInstitution {
            caller,
            institution,
            reply,
        } => {
            let result = ledger
                .add_institution(&caller, institution)
                .map(|()| role_response(institution, "institution"));
            pending(reply, result)
        }
        LedgerCommand::InstitutionStatus { institution, reply } => {
            let record = ledger.institution(&institution);
            let response = InstitutionStatusResponse {
                address: institution,
                verified: ledger.institution_status(&institution),
                listed_by: record.map(|r| r.listed_by),
                listed_at: record.map(|r| r.listed_at),
            };
            pending(reply, Ok(response))
        }
        LedgerCommand::IssueCredential {
            caller,
            owner,
            pointer,
            kind,
            reply,
        } => {
            let result = match kind {
                None => ledger.issue_credential(&caller, owner, pointer),
                Some(IssuerKind::Institution) => {
                    ledger.issue_institution_credential(&caller, owner, pointer)
                }
                Some(IssuerKind::Company) => ledger.issue_company_credential(&caller, owner, pointer),
            };
            let result = result.and_then(|id| {
                let record = ledger.credential(&owner, id)?;
                Ok(IssuedResponse {
                    credential_id: id,
                    owner,
                    issuer: record.issuer,
                    issuer_kind: record.issuer_kind,
                })
            });
            pending(reply, result)
        }
        LedgerCommand::GetCredential {
            caller,
            credential_id,
            reply,
        } => {
            let result = ledger.credential_owned(&caller, credential_id).and_then(|_| {
                let record = ledger.credential(&caller, credential_id)?;
                Ok(CredentialResponse {
                    credential_id,
                    owner: record.owner,
                    issuer: record.issuer,
                    issuer_kind: record.issuer_kind,
                    pointer: record.pointer.clone(),
                    issued_at: record.issued_at,
                    access_root: ledger.access_root(credential_id)?,
                })
            });
            pending(reply, result)
        }
        LedgerCommand::GetAccessRoot {
            credential_id,
            reply,
        } => {
            let result = ledger
                .access_root(credential_id)
                .map(|access_root| AccessRootResponse {
                    credential_id,
                    access_root,
                });
            pending(reply, result)
        }
        LedgerCommand::UpdateAccess {
            caller,
            credential_id,
            access_root,
            reply,
        } => {
            let result = ledger
                .update_access_list(&caller, credential_id, access_root)
                .map(|()| AccessRootResponse {
                    credential_id,
                    access_root,
                });
            pending(reply, result)
        }
        LedgerCommand::RequestAccess {
            caller,
            credential_id,
            reply,
        } => pending(reply, ledger.request_access(&caller, credential_id)),
        LedgerCommand::GrantAccess {
            caller,
            grant,
            reply,
        } => {
            let result = ledger.grant_access(&caller, &grant).map(|()| GrantResponse {
                credential_id: grant.credential_id,
                verifier: grant.verifier,
                status: "granted".into(),
            });
            pending(reply, result)
        }
        LedgerCommand::AddCompany {
            caller,
            company,
            reply,
        } => {
            let result = ledger
                .add_company(&caller, company)
                .map(|_| company_response(ledger, company));
            pending(reply, result)
        }
        LedgerCommand::CompanyStats { company, reply } => {
            pending(reply, Ok(company_response(ledger, company)))
        }
        LedgerCommand::Events { since, reply } => {
            let response = EventsResponse {
                events: ledger.events_since(since).to_vec(),
                next: ledger.next_event_seq(),
            };
            pending(reply, Ok(response))
        }
        LedgerCommand::Status { reply } => {
            let status = LedgerStatus {
                admins: ledger.admin_count(),
                institutions: ledger.institution_count(),
                credentials: ledger.credential_count(),
                companies: ledger.company_count(),
                events: ledger.next_event_seq(),
            };
            pending(reply, Ok(status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accredit_core::{Address, CredentialId, LedgerConfig};
    use tokio::sync::oneshot;

    fn addr(b: u8) -> Address {
        Address::from_bytes([b; 20])
    }

    fn temp_dir() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("accredit-node-test-{}", rand::random::<u64>()))
    }

    fn memory_config() -> AccreditConfig {
        let mut config = AccreditConfig::default();
        config.storage.persist = false;
        config.ledger = LedgerConfig::with_admins([addr(0)]);
        config
    }

    async fn call<T>(
        tx: &mpsc::Sender<LedgerCommand>,
        make: impl FnOnce(Reply<T>) -> LedgerCommand,
    ) -> Result<T, LedgerError> {
        let (reply, rx) = oneshot::channel();
        tx.send(make(reply)).await.unwrap();
        rx.await.unwrap()
    }

    #[test]
    fn test_node_creation() {
        let node = AccreditNode::new(memory_config()).unwrap();
        let ledger = node.ledger().unwrap();
        assert!(ledger.is_admin(&addr(0)));
        assert_eq!(ledger.credential_count(), 0);
    }

    #[test]
    fn test_invalid_ledger_config_rejected() {
        let mut config = memory_config();
        config.ledger.attestation_threshold = 0;
        assert!(AccreditNode::new(config).is_err());
    }

    #[tokio::test]
    async fn test_commands_are_serialized_through_loop() {
        let ledger = Ledger::new(LedgerConfig::with_admins([addr(0)]));
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(run_ledger(ledger, None, rx));

        call(&tx, |reply| LedgerCommand::AddInstitution {
            caller: addr(0),
            institution: addr(1),
            reply,
        })
        .await
        .unwrap();
        let issued = call(&tx, |reply| LedgerCommand::IssueCredential {
            caller: addr(1),
            owner: addr(2),
            pointer: "abcde".into(),
            kind: None,
            reply,
        })
        .await
        .unwrap();
        assert_eq!(issued.credential_id, CredentialId(0));
        assert_eq!(issued.issuer_kind, IssuerKind::Institution);

        let denied = call(&tx, |reply| LedgerCommand::GetCredential {
            caller: addr(3),
            credential_id: CredentialId(0),
            reply,
        })
        .await;
        assert!(matches!(denied, Err(LedgerError::Unauthorized(_))));

        let status = call(&tx, |reply| LedgerCommand::Status { reply })
            .await
            .unwrap();
        assert_eq!(status.institutions, 1);
        assert_eq!(status.credentials, 1);

        drop(tx);
        let ledger = handle.await.unwrap().unwrap();
        assert_eq!(ledger.credential_count(), 1);
    }

    #[tokio::test]
    async fn test_mutations_are_persisted() {
        let dir = temp_dir();
        let store = SnapshotStore::open(&dir).unwrap();
        let ledger = Ledger::new(LedgerConfig::with_admins([addr(0)]));
        let (tx, rx) = mpsc::channel(16);

        let loop_task = async {
            run_ledger(ledger, Some(&store), rx).await.unwrap();
        };
        let client = async {
            call(&tx, |reply| LedgerCommand::AddInstitution {
                caller: addr(0),
                institution: addr(1),
                reply,
            })
            .await
            .unwrap();
            // Rejected transitions leave the snapshot untouched
            let rejected = call(&tx, |reply| LedgerCommand::AddAdmin {
                caller: addr(5),
                admin: addr(6),
                reply,
            })
            .await;
            assert!(rejected.is_err());
            drop(tx);
        };
        tokio::join!(loop_task, client);

        let snapshot = store.load().unwrap().unwrap();
        let restored = Ledger::from_snapshot(LedgerConfig::default(), snapshot).unwrap();
        assert!(restored.institution_status(&addr(1)));
        assert!(!restored.is_admin(&addr(6)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_failed_write_is_not_acknowledged() {
        let dir = temp_dir();
        let store = SnapshotStore::open(&dir).unwrap();
        let ledger = Ledger::new(LedgerConfig::with_admins([addr(0)]));
        let (tx, rx) = mpsc::channel(16);

        let loop_task = run_ledger(ledger, Some(&store), rx);
        let client = async {
            call(&tx, |reply| LedgerCommand::AddInstitution {
                caller: addr(0),
                institution: addr(1),
                reply,
            })
            .await
            .unwrap();

            // Every later snapshot write fails
            std::fs::create_dir(dir.join("ledger.json.tmp")).unwrap();
            let issued = call(&tx, |reply| LedgerCommand::IssueCredential {
                caller: addr(1),
                owner: addr(2),
                pointer: "abcde".into(),
                kind: None,
                reply,
            })
            .await;
            assert!(matches!(issued, Err(LedgerError::Internal(_))));
        };
        let (result, ()) = tokio::join!(loop_task, client);
        assert!(result.is_err());
        assert!(tx.is_closed());

        // Disk holds only what was acknowledged
        let snapshot = store.load().unwrap().unwrap();
        let mut restored = Ledger::from_snapshot(LedgerConfig::default(), snapshot)
            .unwrap()
            .with_events(store.load_events(100).unwrap());
        assert!(restored.institution_status(&addr(1)));
        assert_eq!(restored.credential_count(), 0);
        assert_eq!(restored.next_event_seq(), 1);

        // Id 0 was never promised to anyone
        let id = restored
            .issue_credential(&addr(1), addr(3), "fghij".into())
            .unwrap();
        assert_eq!(id, CredentialId(0));
        assert_eq!(restored.credential_owner(id).unwrap(), addr(3));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_requests_only_append_to_event_log() {
        let dir = temp_dir();
        let mut config = memory_config();
        config.storage.persist = true;
        config.storage.data_dir = dir.clone();
        let store = SnapshotStore::open(&dir).unwrap();
        let (tx, rx) = mpsc::channel(16);

        let loop_task = run_ledger(Ledger::new(config.ledger.clone()), Some(&store), rx);
        let client = async {
            call(&tx, |reply| LedgerCommand::AddInstitution {
                caller: addr(0),
                institution: addr(1),
                reply,
            })
            .await
            .unwrap();
            call(&tx, |reply| LedgerCommand::IssueCredential {
                caller: addr(1),
                owner: addr(2),
                pointer: "abcde".into(),
                kind: None,
                reply,
            })
            .await
            .unwrap();
            let snapshot_before = std::fs::read(dir.join("ledger.json")).unwrap();

            for _ in 0..50 {
                call(&tx, |reply| LedgerCommand::RequestAccess {
                    caller: addr(7),
                    credential_id: CredentialId(0),
                    reply,
                })
                .await
                .unwrap();
            }
            // The snapshot was not rewritten for event-only commands
            assert_eq!(std::fs::read(dir.join("ledger.json")).unwrap(), snapshot_before);
            drop(tx);
        };
        let (result, ()) = tokio::join!(loop_task, client);
        result.unwrap();

        let log = std::fs::read_to_string(dir.join("events.jsonl")).unwrap();
        assert_eq!(log.lines().count(), 52);

        // A restarted node continues the sequence from the log
        let node = AccreditNode::new(config).unwrap();
        let ledger = node.ledger().unwrap();
        assert_eq!(ledger.next_event_seq(), 52);
        assert_eq!(ledger.events_since(51).len(), 1);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_node_restores_from_snapshot() {
        let dir = temp_dir();
        let mut config = memory_config();
        config.storage.persist = true;
        config.storage.data_dir = dir.clone();

        {
            let store = SnapshotStore::open(&dir).unwrap();
            let mut ledger = Ledger::new(config.ledger.clone());
            ledger.add_institution(&addr(0), addr(1)).unwrap();
            store.save(&ledger.snapshot()).unwrap();
        }

        let node = AccreditNode::new(config).unwrap();
        assert!(node.ledger().unwrap().institution_status(&addr(1)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_node_start_and_shutdown() {
        let dir = temp_dir();
        let mut config = memory_config();
        config.storage.persist = true;
        config.storage.data_dir = dir.clone();
        config.api.port = 0;

        let mut node = AccreditNode::new(config).unwrap();
        node.start().await.expect("start failed");
        assert!(node.state().is_some());
        node.shutdown().await.expect("shutdown failed");
        assert!(dir.join("ledger.json").exists());
        std::fs::remove_dir_all(&dir).ok();
    }
}
