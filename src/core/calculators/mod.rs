mod annuity;
mod buy_vs_rent;
mod capital_gains;
mod emi;
mod endowment;
mod equity_returns;
mod fd_sustainability;
mod fire;
mod first_crore;
mod hourly_rate;
mod insurance;
mod mba_roi;
mod mf_vs_nps;
mod sip;
mod tax_deferral;

pub use annuity::{Annuity, AnnuityInput, AnnuityResult, PayoutFrequency};
pub use buy_vs_rent::{BuyVsRent, BuyVsRentInput, BuyVsRentResult, Choice};
pub use capital_gains::{CapitalGains, CapitalGainsInput, CapitalGainsResult};
pub use emi::{Emi, EmiInput, EmiResult};
pub use endowment::{Endowment, EndowmentInput, EndowmentResult};
pub use equity_returns::{EquityReturns, EquityReturnsInput, EquityReturnsResult};
pub use fd_sustainability::{FdSustainability, FdSustainabilityInput, FdSustainabilityResult};
pub use fire::{Fire, FireInput, FireResult};
pub use first_crore::{FirstCrore, FirstCroreInput, FirstCroreResult};
pub use hourly_rate::{HourlyRate, HourlyRateInput, HourlyRateResult};
pub use insurance::{Insurance, InsuranceInput, InsuranceResult};
pub use mba_roi::{MbaRoi, MbaRoiInput, MbaRoiResult};
pub use mf_vs_nps::{MfVsNps, MfVsNpsInput, MfVsNpsResult, Scheme};
pub use sip::{Sip, SipInput, SipResult};
pub use tax_deferral::{TaxDeferral, TaxDeferralInput, TaxDeferralResult};
