use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    #[error("Could not get your location. Location lookup is turned off; set a latitude and longitude or enable IP lookup.")]
    PermissionDenied,

    #[error("Could not get your location. Location information is unavailable ({0}).")]
    Unavailable(String),

    #[error("Could not get your location. The request to get your location timed out.")]
    Timeout,
}
