//! Payment transaction building and canonical encoding.
//!
//! # Responsibilities
//! - Convert currency amounts to base units
//! - Compute the fee from cached network parameters
//! - Produce the canonical bytes the wallet signs
//! - Derive the transaction id from those bytes

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use sha2::{Digest, Sha512_256};

use crate::blockchain::address::{base32_encode, Address};
use crate::blockchain::codec::MsgpackWriter;
use crate::blockchain::types::NetworkParameters;
use crate::error::{CoreError, CoreResult};

/// Base units per whole currency unit.
pub const BASE_UNITS_PER_UNIT: u64 = 1_000_000;

/// Note written when the caller leaves it empty. Changing it changes the
/// signed bytes, so it is kept as-is.
pub const PLACEHOLDER_NOTE: &str = "test";

/// Largest note the network accepts.
pub const MAX_NOTE_BYTES: usize = 1024;

/// Bytes a signature adds to the encoded transaction.
const SIGNATURE_OVERHEAD: u64 = 75;

/// Domain separation prefix hashed in front of the transaction bytes.
const ID_PREFIX: &[u8] = b"TX";

/// Convert a currency amount to base units, rounding half away from zero.
pub fn to_base_units(amount: Decimal) -> CoreResult<u64> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(CoreError::InvalidRequest(format!(
            "amount must not be negative, got {}",
            amount
        )));
    }
    amount
        .checked_mul(Decimal::from(BASE_UNITS_PER_UNIT))
        .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|scaled| scaled.to_u64())
        .ok_or_else(|| CoreError::InvalidRequest(format!("amount {} is out of range", amount)))
}

/// A fully specified payment, ready to be encoded and signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTransaction {
    pub sender: Address,
    pub receiver: Address,
    /// Amount in base units.
    pub amount: u64,
    /// Absolute fee in base units.
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
    pub note: Vec<u8>,
}

impl PaymentTransaction {
    /// Build a payment from cached parameters.
    ///
    /// An empty note is replaced by [`PLACEHOLDER_NOTE`].
    pub fn new(
        sender: Address,
        receiver: Address,
        amount: u64,
        note: &str,
        params: &NetworkParameters,
    ) -> CoreResult<Self> {
        let note = if note.is_empty() { PLACEHOLDER_NOTE } else { note };
        if note.len() > MAX_NOTE_BYTES {
            return Err(CoreError::InvalidRequest(format!(
                "note is {} bytes, limit is {}",
                note.len(),
                MAX_NOTE_BYTES
            )));
        }

        let hash = STANDARD.decode(&params.genesis_hash).map_err(|e| {
            CoreError::InvalidRequest(format!("cached genesis hash is not base64: {}", e))
        })?;
        let genesis_hash: [u8; 32] = hash.as_slice().try_into().map_err(|_| {
            CoreError::InvalidRequest(format!(
                "cached genesis hash must be 32 bytes, got {}",
                hash.len()
            ))
        })?;

        let mut txn = Self {
            sender,
            receiver,
            amount,
            fee: params.fee,
            first_valid: params.first_valid,
            last_valid: params.last_valid,
            genesis_id: params.genesis_id.clone(),
            genesis_hash,
            note: note.as_bytes().to_vec(),
        };

        if !params.flat_fee {
            // Size is estimated with the per-byte rate still in the fee field.
            let estimated = txn.encode().len() as u64 + SIGNATURE_OVERHEAD;
            txn.fee = params.fee.saturating_mul(estimated).max(params.min_fee);
        }

        Ok(txn)
    }

    /// Canonical encoding: sorted keys, zero values omitted.
    pub fn encode(&self) -> Vec<u8> {
        let fields = [
            self.amount != 0,
            self.fee != 0,
            self.first_valid != 0,
            !self.genesis_id.is_empty(),
            true,
            true,
            !self.note.is_empty(),
            !self.receiver.is_zero(),
            true,
            true,
        ];
        let mut w = MsgpackWriter::new();
        w.map_header(fields.iter().filter(|present| **present).count());

        if self.amount != 0 {
            w.str("amt").uint(self.amount);
        }
        if self.fee != 0 {
            w.str("fee").uint(self.fee);
        }
        if self.first_valid != 0 {
            w.str("fv").uint(self.first_valid);
        }
        if !self.genesis_id.is_empty() {
            w.str("gen").str(&self.genesis_id);
        }
        w.str("gh").bin(&self.genesis_hash);
        w.str("lv").uint(self.last_valid);
        if !self.note.is_empty() {
            w.str("note").bin(&self.note);
        }
        if !self.receiver.is_zero() {
            w.str("rcv").bin(self.receiver.public_key());
        }
        w.str("snd").bin(self.sender.public_key());
        w.str("type").str("pay");

        w.into_bytes()
    }

    /// Base64 of the canonical bytes, as handed to the wallet.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.encode())
    }

    /// Transaction id: base32 of SHA-512/256 over `"TX"` and the bytes.
    pub fn id(&self) -> String {
        let mut hasher = Sha512_256::new();
        hasher.update(ID_PREFIX);
        hasher.update(self.encode());
        base32_encode(&hasher.finalize())
    }
}
