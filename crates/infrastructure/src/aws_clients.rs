use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use datamesh_core::{AppError, AppResult, CredentialSource, SessionCredentials};

const CREDENTIALS_PROVIDER_NAME: &str = "datamesh";

/// AWS service clients buildable from a shared SDK configuration.
pub trait AwsServiceClient: Sized {
    /// Service name used in log fields and errors.
    const SERVICE: &'static str;

    /// Builds the client from `config`.
    fn from_sdk_config(config: &SdkConfig) -> Self;
}

impl AwsServiceClient for aws_sdk_iam::Client {
    const SERVICE: &'static str = "iam";

    fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::new(config)
    }
}

impl AwsServiceClient for aws_sdk_sts::Client {
    const SERVICE: &'static str = "sts";

    fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::new(config)
    }
}

impl AwsServiceClient for aws_sdk_dynamodb::Client {
    const SERVICE: &'static str = "dynamodb";

    fn from_sdk_config(config: &SdkConfig) -> Self {
        Self::new(config)
    }
}

/// Loads SDK configuration for the caller from an explicit credential source.
pub async fn load_sdk_config(source: &CredentialSource, region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    loader = match source {
        CredentialSource::Profile(profile_name) => loader.profile_name(profile_name.as_str()),
        CredentialSource::Static(credentials) => {
            loader.credentials_provider(sdk_credentials(credentials))
        }
    };

    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_owned()));
    }

    loader.load().await
}

/// Builds a client for one service from temporary session credentials.
pub async fn generate_client<C: AwsServiceClient>(
    region: &str,
    credentials: &SessionCredentials,
) -> AppResult<C> {
    if region.trim().is_empty() {
        return Err(AppError::Configuration(format!(
            "region is required to build a {} client",
            C::SERVICE
        )));
    }

    let config = load_sdk_config(
        &CredentialSource::Static(credentials.clone()),
        Some(region),
    )
    .await;

    Ok(C::from_sdk_config(&config))
}

fn sdk_credentials(credentials: &SessionCredentials) -> Credentials {
    Credentials::new(
        credentials.access_key_id(),
        credentials.secret_access_key(),
        credentials.session_token().map(str::to_owned),
        None,
        CREDENTIALS_PROVIDER_NAME,
    )
}
