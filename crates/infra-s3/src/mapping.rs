// Domain <-> aws-sdk-s3 type mapping

use aws_sdk_s3::types::{self as s3, GlacierJobParameters, Tier};
use backup_core::domain::{RestoreRequest, RestoreTier, ServerSideEncryption, StorageClass};

/// Service error code returned when a restore for the key is already running
pub(crate) const RESTORE_IN_PROGRESS_CODE: &str = "RestoreAlreadyInProgress";

pub(crate) fn storage_class(class: StorageClass) -> s3::StorageClass {
    s3::StorageClass::from(class.as_str())
}

pub(crate) fn encryption(sse: ServerSideEncryption) -> s3::ServerSideEncryption {
    s3::ServerSideEncryption::from(sse.as_str())
}

pub(crate) fn tier(tier: RestoreTier) -> Tier {
    match tier {
        RestoreTier::Standard => Tier::Standard,
        RestoreTier::Bulk => Tier::Bulk,
        RestoreTier::Expedited => Tier::Expedited,
    }
}

pub(crate) fn restore_request(
    request: &RestoreRequest,
) -> Result<s3::RestoreRequest, aws_sdk_s3::error::BuildError> {
    let job_parameters = GlacierJobParameters::builder()
        .tier(tier(request.tier))
        .build()?;

    Ok(s3::RestoreRequest::builder()
        .days(request.days.get())
        .glacier_job_parameters(job_parameters)
        .build())
}

pub(crate) fn is_restore_in_progress(code: Option<&str>) -> bool {
    code == Some(RESTORE_IN_PROGRESS_CODE)
}

/// S3 keys always use `/`
pub(crate) fn normalise_key(key: &str) -> String {
    key.replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use backup_core::domain::RestoreDays;

    #[test]
    fn test_storage_class_mapping_uses_api_names() {
        for class in StorageClass::ALL {
            assert_eq!(storage_class(class).as_str(), class.as_str());
        }
    }

    #[test]
    fn test_encryption_mapping() {
        assert_eq!(
            encryption(ServerSideEncryption::AwsKms),
            s3::ServerSideEncryption::AwsKms
        );
        assert_eq!(
            encryption(ServerSideEncryption::Aes256),
            s3::ServerSideEncryption::Aes256
        );
    }

    #[test]
    fn test_restore_request_carries_days_and_tier() {
        let request = RestoreRequest::new(RestoreDays::new(12).unwrap(), RestoreTier::Expedited);
        let built = restore_request(&request).unwrap();

        assert_eq!(built.days(), Some(12));
        assert_eq!(
            built.glacier_job_parameters().map(|p| p.tier()),
            Some(&Tier::Expedited)
        );
    }

    #[test]
    fn test_in_progress_detection() {
        assert!(is_restore_in_progress(Some("RestoreAlreadyInProgress")));
        assert!(!is_restore_in_progress(Some("NoSuchKey")));
        assert!(!is_restore_in_progress(None));
    }

    #[test]
    fn test_normalise_key() {
        assert_eq!(normalise_key(r"a\b\c.txt"), "a/b/c.txt");
    }
}
