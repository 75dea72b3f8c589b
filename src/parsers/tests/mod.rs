mod pattern_tests;
