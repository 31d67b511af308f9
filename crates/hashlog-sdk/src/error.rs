use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    Codec(#[from] hashlog_codec::CodecError),

    #[error(transparent)]
    Registry(#[from] hashlog_registry::RegistryError),
}

pub type SdkResult<T> = Result<T, SdkError>;
