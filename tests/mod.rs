mod normalizer_tests;
mod orchestrator_tests;

// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - assistant_tests: Assistant replies applied to the schedule
// - normalizer_tests: Raw record decoding and normalization
// - placement_tests: Week grid placement, agenda rows and their properties
// - orchestrator_tests: The schedule actor, navigation and last-request-wins
// - source_tests: HTTP sources against wiremock, the local store and merging
// - web_tests: The HTTP API driven through the router
// - smoke_tests: Configuration and source assembly
