pub mod cap_table_entry;
pub mod company;
pub mod company_industry;
pub mod funding_round;
pub mod investor_contact;
pub mod investor_firm;
pub mod investor_metrics;
pub mod investor_preference;
pub mod investor_profile;
pub mod session;
pub mod user;

pub use cap_table_entry::Entity as CapTableEntries;
pub use company::Entity as Companies;
pub use company_industry::Entity as CompanyIndustries;
pub use funding_round::Entity as FundingRounds;
pub use investor_contact::Entity as InvestorContacts;
pub use investor_firm::Entity as InvestorFirms;
pub use investor_metrics::Entity as InvestorMetrics;
pub use investor_preference::Entity as InvestorPreferences;
pub use investor_profile::Entity as InvestorProfiles;
pub use session::Entity as Sessions;
pub use user::Entity as Users;
