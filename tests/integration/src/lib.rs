//! End-to-end tests for `saml-protocol` live under `tests/`.
