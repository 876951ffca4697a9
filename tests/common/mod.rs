//! Certificate fixtures shared by the integration tests.
#![allow(dead_code)]

use base64::Engine as _;
use boring::asn1::Asn1Time;
use boring::bn::BigNum;
use boring::ec::{EcGroup, EcKey};
use boring::hash::MessageDigest;
use boring::nid::Nid;
use boring::pkey::{PKey, Private};
use boring::x509::extension::SubjectAlternativeName;
use boring::x509::{X509NameBuilder, X509};

/// A self-signed certificate and its private key.
pub struct TestCert {
    pub cert: X509,
    pub key: PKey<Private>,
}

pub fn generate_key() -> PKey<Private> {
    let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
    PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap()
}

impl TestCert {
    /// Self-signed certificate for `dns_name` with a fresh key.
    pub fn new(dns_name: &str) -> Self {
        Self::with_key(dns_name, generate_key(), 1)
    }

    /// Self-signed certificate for `dns_name` reusing `key`.
    pub fn with_key(dns_name: &str, key: PKey<Private>, serial: u32) -> Self {
        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_nid(Nid::COMMONNAME, dns_name).unwrap();
        let name = name.build();

        let mut builder = X509::builder().unwrap();
        builder.set_version(2).unwrap();
        let serial = BigNum::from_u32(serial).unwrap().to_asn1_integer().unwrap();
        builder.set_serial_number(&serial).unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder.set_pubkey(&key).unwrap();
        builder
            .set_not_before(&Asn1Time::days_from_now(0).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::days_from_now(30).unwrap())
            .unwrap();
        let san = SubjectAlternativeName::new()
            .dns(dns_name)
            .build(&builder.x509v3_context(None, None))
            .unwrap();
        builder.append_extension(san).unwrap();
        builder.sign(&key, MessageDigest::sha256()).unwrap();

        Self {
            cert: builder.build(),
            key,
        }
    }

    pub fn der(&self) -> Vec<u8> {
        self.cert.to_der().unwrap()
    }

    /// Base64 DER, as used by certificate and public key pins.
    pub fn base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(self.der())
    }

    /// Lowercase hex SHA-256 fingerprint computed by BoringSSL.
    pub fn sha256(&self) -> String {
        self.cert
            .digest(MessageDigest::sha256())
            .unwrap()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }
}
