use std::fs;

use anyhow::{Context, Result};

use crate::model::{AppState, SyncRecord, SyncSignature};

use super::{LocalStore, SIGNATURE_FILE, STATE_FILE, write_atomic};

impl LocalStore {
    pub fn read_state(&self) -> Result<AppState> {
        let path = self.root.join(STATE_FILE);
        if !path.exists() {
            return Ok(AppState {
                version: 1,
                last_sync: None,
            });
        }
        let bytes = fs::read(&path).context("read state.json")?;
        let st: AppState = serde_json::from_slice(&bytes).context("parse state.json")?;
        if st.version != 1 {
            anyhow::bail!("unsupported state version {}", st.version);
        }
        Ok(st)
    }

    pub fn write_state(&self, st: &AppState) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(st).context("serialize state")?;
        write_atomic(&self.root.join(STATE_FILE), &bytes).context("write state.json")?;
        Ok(())
    }

    pub fn set_last_sync(&self, record: SyncRecord) -> Result<()> {
        let mut st = self.read_state()?;
        st.last_sync = Some(record);
        self.write_state(&st)
    }

    /// Signature of the last applied manifest; `None` if nothing was ever synced.
    pub fn read_signature(&self) -> Result<Option<SyncSignature>> {
        let path = self.root.join(SIGNATURE_FILE);
        match fs::read_to_string(&path) {
            Ok(s) => Ok(Some(SyncSignature(s))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("read {}", path.display())),
        }
    }

    pub fn write_signature(&self, sig: &SyncSignature) -> Result<()> {
        write_atomic(&self.root.join(SIGNATURE_FILE), sig.as_str().as_bytes())
            .context("write signature")
    }

    pub fn clear_signature(&self) -> Result<()> {
        let path = self.root.join(SIGNATURE_FILE);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| format!("remove {}", path.display())),
        }
    }
}
