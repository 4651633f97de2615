//! Save-state container.
//!
//! Layout: the magic `LBST`, a little-endian `u16` format version, then the
//! postcard encoding of the cartridge fingerprint, the CPU and the bus. The
//! ROM image is never stored.

use serde::{Deserialize, Serialize};

use super::GameBoyBus;
use crate::cpu::Cpu;
use crate::error::{Error, Result};

const MAGIC: &[u8; 4] = b"LBST";
const VERSION: u16 = 1;
const PREAMBLE_LEN: usize = MAGIC.len() + 2;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    fingerprint: u64,
    cpu: &'a Cpu,
    bus: &'a GameBoyBus,
}

#[derive(Deserialize)]
struct Snapshot {
    fingerprint: u64,
    cpu: Cpu,
    bus: GameBoyBus,
}

pub(crate) fn encode(cpu: &Cpu, bus: &GameBoyBus) -> Result<Vec<u8>> {
    let snapshot = SnapshotRef {
        fingerprint: bus.cartridge.fingerprint(),
        cpu,
        bus,
    };
    let mut out = Vec::with_capacity(96 * 1024);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    let body = postcard::to_allocvec(&snapshot)
        .map_err(|e| Error::corrupt_state(format!("cannot encode state: {e}")))?;
    out.extend_from_slice(&body);
    Ok(out)
}

/// Decode a snapshot and check it against the running machine `current`.
///
/// Nothing in `current` is touched; the caller swaps the result in.
pub(crate) fn decode(bytes: &[u8], current: &GameBoyBus) -> Result<(Cpu, GameBoyBus)> {
    if bytes.len() < PREAMBLE_LEN {
        return Err(Error::corrupt_state("state is truncated"));
    }
    let (preamble, body) = bytes.split_at(PREAMBLE_LEN);
    if &preamble[..MAGIC.len()] != MAGIC {
        return Err(Error::corrupt_state("bad magic"));
    }
    let version = u16::from_le_bytes([preamble[4], preamble[5]]);
    if version != VERSION {
        return Err(Error::corrupt_state(format!(
            "unsupported version {version} (expected {VERSION})"
        )));
    }

    let (snapshot, rest): (Snapshot, _) = postcard::take_from_bytes(body)
        .map_err(|e| Error::corrupt_state(format!("cannot decode state: {e}")))?;
    if !rest.is_empty() {
        return Err(Error::corrupt_state(format!(
            "{} trailing bytes after state",
            rest.len()
        )));
    }

    if snapshot.fingerprint != current.cartridge.fingerprint() {
        return Err(Error::corrupt_state("state belongs to a different cartridge"));
    }
    let bus = snapshot.bus;
    if bus.cartridge.fingerprint() != snapshot.fingerprint {
        return Err(Error::corrupt_state("cartridge fingerprint mismatch"));
    }
    if bus.model() != current.model() || bus.cgb_mode() != current.cgb_mode() {
        return Err(Error::corrupt_state("state was saved on a different model"));
    }
    bus.cartridge
        .validate_against(&current.cartridge)
        .map_err(Error::corrupt_state)?;
    bus.validate().map_err(Error::corrupt_state)?;

    Ok((snapshot.cpu, bus))
}
