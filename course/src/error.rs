use netcache::CacheError;
use overpass::QueryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CourseError {
    #[error("{0}")]
    Query(#[from] QueryError),

    #[error("{0}")]
    Cache(#[from] CacheError),

    #[error("unknown course {0}")]
    UnknownCourse(String),

    #[error("no boundary for course {0} in query results")]
    MissingBoundary(String),
}
