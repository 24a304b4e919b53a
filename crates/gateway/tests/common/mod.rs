//! Integration test helpers: TLS test services and client PEM fixtures.

#![allow(dead_code)]

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use openssl::symm::Cipher;
use openssl::x509::{X509, X509NameBuilder};
use rustls::RootCertStore;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::server::WebPkiClientVerifier;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Hostnames every test service answers for
pub const SERVICE_HOSTS: [&str; 3] = [
    "gateway.sandbox.push.apple.com",
    "feedback.sandbox.push.apple.com",
    "localhost",
];

/// Default timeout for test operations
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

pub fn setup() {
    let _ = env_logger::try_init();
}

/// Write a client certificate and RSA key (encrypted if `passphrase` is set)
/// into `dir` and return the PEM path
pub fn write_client_pem(dir: &Path, passphrase: Option<&str>) -> PathBuf {
    let rsa = Rsa::generate(2048).unwrap();
    let key = PKey::from_rsa(rsa.clone()).unwrap();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", "Apple Push Services: com.example.app")
        .unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(7).unwrap().to_asn1_integer().unwrap();
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
    builder.sign(&key, MessageDigest::sha256()).unwrap();

    let mut pem = builder.build().to_pem().unwrap();
    let key_pem = match passphrase {
        Some(passphrase) => rsa
            .private_key_to_pem_passphrase(Cipher::aes_256_cbc(), passphrase.as_bytes())
            .unwrap(),
        None => rsa.private_key_to_pem().unwrap(),
    };
    pem.extend(key_pem);

    let path = dir.join("client.pem");
    std::fs::write(&path, pem).unwrap();
    path
}

/// Certificate of a client PEM bundle, as the server sees it
pub fn client_certificate(pem_path: &Path) -> CertificateDer<'static> {
    let pem = std::fs::read(pem_path).unwrap();
    CertificateDer::from(X509::from_pem(&pem).unwrap().to_der().unwrap())
}

/// What a test service does once the TLS session is up
enum Behavior {
    /// Read until the client closes, return everything received
    Record,
    /// Send these bytes, then close
    Serve(Vec<u8>),
}

/// What a test service saw over its one connection
#[derive(Debug, Default)]
pub struct Observed {
    /// Leaf certificate the client presented, if any
    pub client_certificate: Option<CertificateDer<'static>>,
    pub received: Vec<u8>,
}

/// A single-connection TLS service on loopback
pub struct TestService {
    pub addr: SocketAddr,
    pub certificate: CertificateDer<'static>,
    pub certificate_pem: String,
    task: JoinHandle<Observed>,
}

impl TestService {
    /// Gateway double recording submitted bytes
    pub async fn recording_gateway() -> Self {
        Self::spawn(Behavior::Record, None).await
    }

    /// Gateway double that requires a client certificate issued by `client_root`
    pub async fn authenticating_gateway(client_root: CertificateDer<'static>) -> Self {
        Self::spawn(Behavior::Record, Some(client_root)).await
    }

    /// Feedback double streaming `records` and closing
    pub async fn feedback(records: Vec<u8>) -> Self {
        Self::spawn(Behavior::Serve(records), None).await
    }

    async fn spawn(behavior: Behavior, client_root: Option<CertificateDer<'static>>) -> Self {
        let rcgen::CertifiedKey { cert, key_pair } = rcgen::generate_simple_self_signed(
            SERVICE_HOSTS.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
        )
        .unwrap();
        let certificate = cert.der().clone();
        let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key_pair.serialize_der()));

        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let builder = rustls::ServerConfig::builder_with_provider(provider.clone())
            .with_safe_default_protocol_versions()
            .unwrap();
        let builder = match client_root {
            Some(root) => {
                let mut roots = RootCertStore::empty();
                roots.add(root).unwrap();
                let verifier = WebPkiClientVerifier::builder_with_provider(Arc::new(roots), provider)
                    .build()
                    .unwrap();
                builder.with_client_cert_verifier(verifier)
            }
            None => builder.with_no_client_auth(),
        };
        let config = builder
            .with_single_cert(vec![certificate.clone()], key)
            .unwrap();
        let acceptor = tokio_rustls::TlsAcceptor::from(Arc::new(config));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let task = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut tls = match acceptor.accept(socket).await {
                Ok(tls) => tls,
                // One side refused the other's certificate
                Err(_) => return Observed::default(),
            };

            let mut observed = Observed {
                client_certificate: tls
                    .get_ref()
                    .1
                    .peer_certificates()
                    .and_then(|chain| chain.first())
                    .cloned(),
                received: Vec::new(),
            };
            match behavior {
                Behavior::Record => {
                    read_until_closed(&mut tls, &mut observed.received).await;
                }
                Behavior::Serve(bytes) => {
                    tls.write_all(&bytes).await.unwrap();
                    tls.shutdown().await.unwrap();
                    read_until_closed(&mut tls, &mut observed.received).await;
                }
            }
            observed
        });

        Self {
            addr,
            certificate,
            certificate_pem: cert.pem(),
            task,
        }
    }

    /// Everything the service saw over its one connection
    pub async fn observed(self) -> Observed {
        tokio::time::timeout(TEST_TIMEOUT, self.task)
            .await
            .expect("service timed out")
            .expect("service task failed")
    }

    /// Bytes the service received over its one connection
    pub async fn received(self) -> Vec<u8> {
        self.observed().await.received
    }
}

async fn read_until_closed<S: AsyncReadExt + Unpin>(stream: &mut S, buf: &mut Vec<u8>) {
    match stream.read_to_end(buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {}
        Err(e) => panic!("service read failed: {}", e),
    }
}

/// One 38-byte feedback record
pub fn feedback_record(timestamp: u32, token: [u8; 32]) -> Vec<u8> {
    let mut bytes = timestamp.to_be_bytes().to_vec();
    bytes.extend_from_slice(&32u16.to_be_bytes());
    bytes.extend_from_slice(&token);
    bytes
}
