//! RSA key pair shared by unit tests. Test-only material, never deployed.
//!
//! The PEM files live under `testdata/` so the integration suites can
//! include the same bytes.

pub const TEST_PRIVATE_KEY_PEM: &str = include_str!("../testdata/test_rsa_private.pem");

pub const TEST_PUBLIC_KEY_PEM: &str = include_str!("../testdata/test_rsa_public.pem");
