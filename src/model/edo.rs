//! Entangled Data Object - a tamper-evident pairing of digital and physical state

use super::{Hash, HashAlgorithm};
use crate::canonical::{self, JsonStyle};
use crate::config::PhiConfig;
use crate::sequence::{PHI, PHI_INV};
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Two independent state records bound under one digest
///
/// The digest covers both canonical states and the derived coherence flag.
/// It is computed once at construction; any change to either state means
/// building a new object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntangledDataObject {
    digital_state: Value,
    physical_state: Value,
    coherence_flag: bool,
    digest: Hash,
    algorithm: HashAlgorithm,
    style: JsonStyle,
    tolerance: f64,
}

impl EntangledDataObject {
    /// Build an EDO with the default configuration
    pub fn new<D, P>(digital_state: &D, physical_state: &P) -> Result<Self>
    where
        D: Serialize + ?Sized,
        P: Serialize + ?Sized,
    {
        Self::with_config(digital_state, physical_state, &PhiConfig::default())
    }

    /// Build an EDO using the hash, canonical style and tolerance from `config`
    pub fn with_config<D, P>(
        digital_state: &D,
        physical_state: &P,
        config: &PhiConfig,
    ) -> Result<Self>
    where
        D: Serialize + ?Sized,
        P: Serialize + ?Sized,
    {
        let digital_state = canonical::to_value(digital_state)?;
        let physical_state = canonical::to_value(physical_state)?;
        let derived = derive(
            &digital_state,
            &physical_state,
            config.hash_algorithm,
            config.json_style,
            config.coherence_tolerance,
        )?;

        tracing::trace!(
            digest = %derived.digest.short(),
            coherent = derived.coherence_flag,
            "built entangled data object"
        );

        Ok(EntangledDataObject {
            digital_state,
            physical_state,
            coherence_flag: derived.coherence_flag,
            digest: derived.digest,
            algorithm: config.hash_algorithm,
            style: config.json_style,
            tolerance: config.coherence_tolerance,
        })
    }

    /// The digest this object contributes to a tree as a leaf
    pub fn leaf_data(&self) -> Hash {
        self.digest
    }

    /// Whether the length ratio of the two states approximates φ or φ⁻¹
    pub fn coherence_flag(&self) -> bool {
        self.coherence_flag
    }

    pub fn digital_state(&self) -> &Value {
        &self.digital_state
    }

    pub fn physical_state(&self) -> &Value {
        &self.physical_state
    }

    /// Self-consistency check: recompute the digest from the stored states
    ///
    /// Only detects corruption of the stored digest or states. It says
    /// nothing about whether the states still match the outside world; use
    /// [`revalidate`](Self::revalidate) for that.
    pub fn is_coherent(&self) -> bool {
        match derive(
            &self.digital_state,
            &self.physical_state,
            self.algorithm,
            self.style,
            self.tolerance,
        ) {
            Ok(derived) => derived.digest == self.digest,
            Err(_) => false,
        }
    }

    /// Check a freshly observed state pair against the stored digest
    ///
    /// Returns `Ok(true)` when the fresh pair derives exactly the digest this
    /// object carries.
    pub fn revalidate<D, P>(&self, digital_state: &D, physical_state: &P) -> Result<bool>
    where
        D: Serialize + ?Sized,
        P: Serialize + ?Sized,
    {
        let digital_state = canonical::to_value(digital_state)?;
        let physical_state = canonical::to_value(physical_state)?;
        let derived = derive(
            &digital_state,
            &physical_state,
            self.algorithm,
            self.style,
            self.tolerance,
        )?;
        Ok(derived.digest == self.digest)
    }
}

/// Build a leaf with the default configuration, returning its digest and
/// coherence flag
pub fn build_leaf<D, P>(digital_state: &D, physical_state: &P) -> Result<(Hash, bool)>
where
    D: Serialize + ?Sized,
    P: Serialize + ?Sized,
{
    let edo = EntangledDataObject::new(digital_state, physical_state)?;
    Ok((edo.leaf_data(), edo.coherence_flag()))
}

/// Ratio of digital to physical canonical length; 0 when physical is empty
pub fn length_ratio(digital_len: usize, physical_len: usize) -> f64 {
    if physical_len == 0 {
        0.0
    } else {
        digital_len as f64 / physical_len as f64
    }
}

/// Whether `ratio` lies strictly within `tolerance` of φ or φ⁻¹
pub fn is_phi_coherent(ratio: f64, tolerance: f64) -> bool {
    (ratio - PHI).abs() < tolerance || (ratio - PHI_INV).abs() < tolerance
}

struct Derived {
    coherence_flag: bool,
    digest: Hash,
}

fn derive(
    digital: &Value,
    physical: &Value,
    algorithm: HashAlgorithm,
    style: JsonStyle,
    tolerance: f64,
) -> Result<Derived> {
    let digital_text = canonical::canonicalize(digital, style)?;
    let physical_text = canonical::canonicalize(physical, style)?;

    let ratio = length_ratio(
        canonical::canonical_len(&digital_text),
        canonical::canonical_len(&physical_text),
    );
    let coherence_flag = is_phi_coherent(ratio, tolerance);
    let flag_text: &[u8] = if coherence_flag { b"True" } else { b"False" };

    let digest = algorithm.digest_many(&[
        digital_text.as_bytes(),
        physical_text.as_bytes(),
        flag_text,
    ]);

    Ok(Derived {
        coherence_flag,
        digest,
    })
}
