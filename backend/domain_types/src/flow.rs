//! Marker types for gateway flows. Each adapter implements the flows its
//! provider offers; the rest fall through to NotImplemented defaults.

/// Direct charge or fund reservation. A charge is an authorize with
/// `auto_capture` set.
#[derive(Debug, Clone)]
pub struct Authorize;

/// Settle a prior authorization.
#[derive(Debug, Clone)]
pub struct Capture;

/// Cancel an authorization or charge before settlement.
#[derive(Debug, Clone)]
pub struct Void;

/// Reverse a settled charge.
#[derive(Debug, Clone)]
pub struct Refund;

/// Authoritative re-query of a transaction's current status at the
/// provider. Also the browser-return flow: client-supplied parameters are
/// never trusted, the provider is asked instead.
#[derive(Debug, Clone)]
pub struct PSync;

/// Build the redirect/off-site checkout a non-merchant gateway sends the
/// payer's browser to.
#[derive(Debug, Clone)]
pub struct CreateRedirect;
