//! Reads and validates the per-role `host:port` listing from the TOML
//! config file at the crate root. Bad or missing entries surface as
//! `PaxosError::Config` rather than panicking.

use std::collections::HashMap;
use std::net::SocketAddr;

use config::{Config, File};
use log::info;

use crate::error::{PaxosError, Result};
use crate::types::{AcceptorId, MAX_PROPOSERS, N_OF_ACCEPTORS, QUORUM};

/// The `host:port` listing for every acceptor and proposer in this
/// deployment, indexed by role and 0-based position. `learners` is an
/// optional, unbounded audience acceptors fan their accept-acks out to;
/// it plays no part in the protocol's safety or liveness.
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub acceptors: Vec<SocketAddr>,
    pub proposers: Vec<SocketAddr>,
    pub learners: Vec<SocketAddr>,
}

impl NetConfig {
    pub fn load(file_name: &str) -> Result<Self> {
        let raw = read_raw(file_name)?;

        let acceptors = parse_table(&raw, "acceptors")?;
        let proposers = parse_table(&raw, "proposers")?;
        let learners = parse_table(&raw, "learners").unwrap_or_default();

        if acceptors.len() != N_OF_ACCEPTORS {
            return Err(PaxosError::Config(format!(
                "config declares {} acceptors but this build's N_OF_ACCEPTORS is {}",
                acceptors.len(),
                N_OF_ACCEPTORS
            )));
        }
        if proposers.len() > MAX_PROPOSERS as usize {
            return Err(PaxosError::Config(format!(
                "config declares {} proposers, exceeding MAX_PROPOSERS of {}",
                proposers.len(),
                MAX_PROPOSERS
            )));
        }

        info!(
            "loaded config from {}: {} acceptors, {} proposers, {} learners",
            file_name,
            acceptors.len(),
            proposers.len(),
            learners.len()
        );

        Ok(NetConfig {
            acceptors,
            proposers,
            learners,
        })
    }

    pub fn acceptor_addr(&self, id: AcceptorId) -> Option<SocketAddr> {
        if id < 0 {
            return None;
        }
        self.acceptors.get(id as usize).copied()
    }

    pub fn proposer_addr(&self, id: i32) -> Option<SocketAddr> {
        if id < 0 {
            return None;
        }
        self.proposers.get(id as usize).copied()
    }

    pub fn quorum_size(&self) -> usize {
        QUORUM
    }
}

fn read_raw(file_name: &str) -> Result<HashMap<String, HashMap<String, String>>> {
    let mut c = Config::default();
    c.merge(File::with_name(file_name))
        .map_err(|e| PaxosError::Config(e.to_string()))?;
    c.try_into::<HashMap<String, HashMap<String, String>>>()
        .map_err(|e| PaxosError::Config(e.to_string()))
}

fn parse_table(raw: &HashMap<String, HashMap<String, String>>, key: &str) -> Result<Vec<SocketAddr>> {
    let table = raw
        .get(key)
        .ok_or_else(|| PaxosError::Config(format!("missing [{key}] table in config")))?;

    let mut entries: Vec<(usize, SocketAddr)> = Vec::with_capacity(table.len());
    for (idx_str, host_port) in table {
        let idx: usize = idx_str
            .parse()
            .map_err(|_| PaxosError::Config(format!("bad index '{idx_str}' in [{key}]")))?;
        let addr: SocketAddr = host_port
            .parse()
            .map_err(|_| PaxosError::Config(format!("bad address '{host_port}' in [{key}]")))?;
        entries.push((idx, addr));
    }
    entries.sort_by_key(|(idx, _)| *idx);

    for (expected, (idx, _)) in entries.iter().enumerate() {
        if *idx != expected {
            return Err(PaxosError::Config(format!(
                "[{key}] indices must be contiguous from 0, found gap at {expected}"
            )));
        }
    }

    Ok(entries.into_iter().map(|(_, addr)| addr).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct TempConfig {
        stem: String,
        path: std::path::PathBuf,
    }

    impl Drop for TempConfig {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    fn write_temp_config(name: &str, contents: &str) -> TempConfig {
        let path = std::env::temp_dir().join(format!("paxos-test-{}-{}.toml", name, std::process::id()));
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        let stem = path.with_extension("").to_string_lossy().to_string();
        TempConfig { stem, path }
    }

    #[test]
    fn loads_and_sorts_by_index() {
        let cfg_file = write_temp_config(
            "sorted",
            r#"
            [acceptors]
            1 = "127.0.0.1:9001"
            0 = "127.0.0.1:9000"
            2 = "127.0.0.1:9002"

            [proposers]
            0 = "127.0.0.1:9100"
            "#,
        );
        let cfg = NetConfig::load(&cfg_file.stem).expect("valid config");
        assert_eq!(cfg.acceptors.len(), 3);
        assert_eq!(cfg.acceptors[0].port(), 9000);
        assert_eq!(cfg.acceptors[1].port(), 9001);
        assert_eq!(cfg.acceptors[2].port(), 9002);
        assert_eq!(cfg.quorum_size(), 2);
    }

    #[test]
    fn rejects_wrong_acceptor_count() {
        let cfg_file = write_temp_config(
            "wrong-count",
            r#"
            [acceptors]
            0 = "127.0.0.1:9000"

            [proposers]
            0 = "127.0.0.1:9100"
            "#,
        );
        let err = NetConfig::load(&cfg_file.stem).expect_err("only 1 acceptor declared");
        assert!(matches!(err, PaxosError::Config(_)));
    }
}
