//! Route handlers.

mod campaigns;
mod health;
mod leads;

pub use campaigns::{
    campaign_stats, list_templates, run_campaign, CampaignRequest, CampaignResponse,
};
pub use health::{health_handler, info_handler, root_handler};
pub use leads::{count_leads, list_leads, list_processed};
