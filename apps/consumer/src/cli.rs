use clap::{Parser, Subcommand};
use datamesh_domain::SubscriptionRequest;

#[derive(Parser, Debug)]
#[command(
    name = "datamesh-consumer",
    version,
    about = "Set up a data consumer account and request access to data mesh products"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Create the consumer role, user and group and let them assume the mesh role
    Init,

    /// Request access to a data product
    Request {
        /// Account owning the data product
        #[arg(long)]
        owner_account_id: String,

        /// Catalog database of the product
        #[arg(long)]
        database: String,

        /// Requested permission; repeat for several
        #[arg(long = "permission", default_value = "SELECT")]
        permissions: Vec<String>,

        /// Table to request; repeat for several, omit for the whole database
        #[arg(long = "table")]
        tables: Vec<String>,

        /// Principal the grants are for; defaults to the consumer role
        #[arg(long)]
        principal: Option<String>,
    },

    /// Show an access request
    Get {
        /// Request id returned by `request`
        request_id: String,
    },

    /// List product access held by a principal
    List {
        /// Principal to list grants for
        principal_id: String,
    },
}

/// Builds a subscription request from the `request` subcommand arguments.
pub fn subscription_request(
    owner_account_id: &str,
    database: &str,
    permissions: &[String],
    tables: &[String],
    principal: Option<&str>,
) -> SubscriptionRequest {
    SubscriptionRequest {
        owner_account_id: owner_account_id.to_owned(),
        database_name: database.to_owned(),
        tables: (!tables.is_empty()).then(|| tables.to_vec()),
        principal: principal.map(str::to_owned),
        requested_grants: permissions.to_vec(),
    }
}
