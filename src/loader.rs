//! Loading of user records from the users file

use crate::error::UserInsightsError;
use crate::models::User;

use expanduser::expanduser;
use serde_json::Value;

/// Read and parse the users file.
///
/// The file must contain a JSON array of objects. Each element is converted into a [User]; known
/// fields of the wrong type are treated as absent.
///
/// # Arguments
///
/// * `path`: Path to the users file. A leading `~` is expanded to the user's home directory.
#[tracing::instrument(level = "DEBUG")]
pub async fn load_users(path: &str) -> Result<Vec<User>, UserInsightsError> {
    let path = expanduser(path)?;
    let contents = tokio::fs::read(&path).await?;
    tracing::debug!(bytes = contents.len(), "read users file");
    parse_users(&contents)
}

/// Parse a JSON document into a list of users.
pub fn parse_users(contents: &[u8]) -> Result<Vec<User>, UserInsightsError> {
    let document: Value =
        serde_json::from_slice(contents).map_err(UserInsightsError::UsersFileParse)?;
    let Value::Array(elements) = document else {
        return Err(UserInsightsError::NotAnArray);
    };
    elements
        .into_iter()
        .enumerate()
        .map(|(index, element)| {
            serde_json::from_value(element)
                .map_err(|source| UserInsightsError::InvalidRecord { index, source })
        })
        .collect()
}
