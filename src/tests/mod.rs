
mod test_scenarios;
mod test_tool_inverse;
mod test_chain;
