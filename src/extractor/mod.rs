pub mod candidates;
pub mod count;
pub mod listing;
pub mod models;
pub mod selector;
pub mod traits;

pub use candidates::{CandidateExtractor, CandidateStrategy};
pub use count::CountScraper;
pub use listing::ListingExtractor;
pub use models::{
    CandidateList, DestinationName, ListingItem, MediaCandidate, MediaExtension, RenderedPage,
    SelectionResult,
};
pub use selector::select;
pub use traits::{ElementQuery, PageElement, PageSession, SessionLauncher};
