// Provider drivers / 存储提供商驱动
//
// S3 and GCS are deliberately separate paths with no shared trait.
pub mod gcs;
pub mod s3;
