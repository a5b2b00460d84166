pub use crate::{
    analysis::{ArrivalCorrelator, Correlation, QualitySummary},
    api::{TransitApi, TransitClient, WeatherApi, WeatherClient},
    assembler::assemble,
    catalog::{RouteCatalog, Stop},
    collector::{Collector, RunSummary},
    poller::{Moment, Poller, Prediction, VehiclePosition, Weather},
    shared::{Coordinate, Distance, Time},
    store::{Candidate, DailySink, PredictionRecord, RecordStore},
};
